//! Local echo pipeline
//!
//! Picks up submissions from the store and streams a reply into the
//! placeholder response, a few words at a time, then marks it finished.
//! A message starting with `/fail` produces an error response instead.

use gpui::*;
use std::time::Duration;

use crate::state::ConvoState;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const CHUNK_DELAY: Duration = Duration::from_millis(40);
const FAIL_COMMAND: &str = "/fail";

/// Reply text for a submitted message and whether it is an error.
fn echo_reply(text: &str) -> (String, bool) {
    let text = text.trim();
    if text.starts_with(FAIL_COMMAND) {
        ("The echo pipeline was asked to fail.".to_string(), true)
    } else {
        (format!("You said:\n\n{}", text), false)
    }
}

/// Split a reply into streamed chunks, keeping the separating spaces.
fn chunks(reply: &str) -> impl Iterator<Item = &str> {
    reply.split_inclusive(' ')
}

/// Start the echo pipeline task
pub fn start_echo_pipeline(cx: &mut App) {
    tracing::info!("Starting echo pipeline");

    cx.spawn(async move |cx| {
        loop {
            cx.background_executor().timer(POLL_INTERVAL).await;

            let taken = cx.update(|cx| cx.global_mut::<ConvoState>().store.take_submission());
            let submission = match taken {
                Ok(submission) => submission,
                Err(_) => break,
            };
            let Some(submission) = submission else {
                continue;
            };

            tracing::debug!(
                "Submission received: {}",
                serde_json::to_string(&submission).unwrap_or_default()
            );

            let response_id = submission.initial_response.message_id.clone();
            let (reply, failed) = echo_reply(&submission.message.message.text);

            for chunk in chunks(&reply) {
                cx.background_executor().timer(CHUNK_DELAY).await;

                let appended = cx.update(|cx| {
                    let appended = cx
                        .global_mut::<ConvoState>()
                        .store
                        .append_text(&response_id, chunk);
                    cx.refresh_windows();
                    appended
                });
                match appended {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!("Response {} disappeared while streaming", response_id);
                        break;
                    }
                    Err(_) => return,
                }
            }

            let _ = cx.update(|cx| {
                let state = cx.global_mut::<ConvoState>();
                state.store.finish_message(&response_id, failed);
                cx.refresh_windows();
            });
            tracing::info!("Response {} finished (error={})", response_id, failed);
        }
    })
    .detach();
}
