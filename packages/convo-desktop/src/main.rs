//! Convo Desktop - GPUI shell for branching chat conversations
//!
//! Draws the selected path of a conversation, lets the user edit and
//! resubmit messages, and switches between sibling responses. Submissions
//! are answered by a local echo pipeline.

mod components;
mod keyboard;
mod pipeline;
mod state;
mod theme;
mod views;

use anyhow::{Context as _, Result};
use convo_core::{load_messages, ConvoConfig};
use gpui::prelude::*;
use gpui::*;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Convo Desktop");

    let config = ConvoConfig::load();
    let messages = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => load_messages(&path)
            .with_context(|| format!("Failed to load conversation from {}", path.display()))?,
        None => state::demo_conversation(),
    };
    tracing::info!("Loaded {} messages", messages.len());

    Application::new().run(move |cx: &mut App| {
        state::init(&config, messages, cx);
        theme::init(cx);
        keyboard::init(cx);
        pipeline::start_echo_pipeline(cx);

        let opened = cx.open_window(
            WindowOptions {
                titlebar: Some(TitlebarOptions {
                    title: Some("Convo".into()),
                    appears_transparent: true,
                    ..Default::default()
                }),
                window_bounds: Some(WindowBounds::Windowed(Bounds {
                    origin: point(px(100.0), px(100.0)),
                    size: size(px(900.0), px(760.0)),
                })),
                ..Default::default()
            },
            |window, cx| {
                cx.new(|cx| {
                    let view = views::conversation::ConversationView::new(&config, cx);
                    view.focus(window, cx);
                    view
                })
            },
        );

        match opened {
            Ok(_) => tracing::info!("Convo Desktop window opened"),
            Err(e) => {
                tracing::error!("Failed to open window: {}", e);
                cx.quit();
            }
        }
    });

    Ok(())
}
