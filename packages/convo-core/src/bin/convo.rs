//! Convo CLI - inspect conversations and build resubmissions from the shell.
//!
//! Every command prints a JSON `ApiResponse`.

use clap::{Parser, Subcommand};
use convo_core::{
    build_tree, load_messages, ApiResponse, ConvoConfig, MemoryStore, NoScroll, RenderDeps,
    Store, Thread, UuidIds,
};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "convo")]
#[command(about = "Render and edit branching chat conversations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the displayed path as a view tree
    Render {
        /// Conversation JSON file
        #[arg(short, long)]
        file: PathBuf,
        /// Treat a submission as in flight
        #[arg(long)]
        submitting: bool,
        /// Message shown in edit mode
        #[arg(short, long)]
        edit: Option<String>,
        /// Selected model
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Print the reply tree built from the flat list
    Tree {
        /// Conversation JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Save edited text for a message and print the resulting submission
    Resubmit {
        /// Conversation JSON file
        #[arg(short, long)]
        file: PathBuf,
        /// Id of the edited message
        #[arg(short = 'i', long)]
        message: String,
        /// New text
        #[arg(short, long)]
        text: String,
        /// Selected model
        #[arg(short, long)]
        model: Option<String>,
        /// Label of a custom model
        #[arg(long)]
        label: Option<String>,
        /// Prompt prefix, overriding the configured one
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = ConvoConfig::load();

    let output = match cli.command {
        Commands::Render {
            file,
            submitting,
            edit,
            model,
        } => handle_render(&config, file, submitting, edit, model),
        Commands::Tree { file } => handle_tree(file),
        Commands::Resubmit {
            file,
            message,
            text,
            model,
            label,
            prefix,
        } => handle_resubmit(&config, file, &message, &text, model, label, prefix),
    };

    println!("{}", output);
}

fn error_json(e: impl ToString) -> String {
    serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string())).unwrap()
}

fn open_store(
    config: &ConvoConfig,
    file: &Path,
    model: Option<String>,
    label: Option<String>,
    prefix: Option<String>,
) -> convo_core::Result<MemoryStore> {
    let messages = load_messages(file)?;
    let mut store = MemoryStore::new(config).with_messages(messages);
    let model = model.unwrap_or_else(|| config.default_model.clone());
    let (default_label, default_prefix) = config.model_params(&model);
    store.select_model(&model, label.or(default_label), prefix.or(default_prefix));
    Ok(store)
}

fn handle_render(
    config: &ConvoConfig,
    file: PathBuf,
    submitting: bool,
    edit: Option<String>,
    model: Option<String>,
) -> String {
    let mut store = match open_store(config, &file, model, None, None) {
        Ok(store) => store,
        Err(e) => return error_json(e),
    };
    if submitting {
        store.set_submit_state(true);
    }

    let messages = store.messages().to_vec();
    let roots = build_tree(&messages);
    let mut thread = Thread::new();
    if let Some(id) = edit {
        thread.enter_edit(&id);
    }

    let deps = RenderDeps::from_config(config);
    let view = thread.render(&roots, &messages, &mut store, &mut NoScroll, &deps);
    serde_json::to_string_pretty(&ApiResponse::ok(json!({
        "view": view,
        "conversation": store.conversation(),
    })))
    .unwrap()
}

fn handle_tree(file: PathBuf) -> String {
    match load_messages(&file) {
        Ok(messages) => serde_json::to_string_pretty(&ApiResponse::ok(json!({
            "roots": build_tree(&messages),
            "count": messages.len(),
        })))
        .unwrap(),
        Err(e) => error_json(e),
    }
}

fn handle_resubmit(
    config: &ConvoConfig,
    file: PathBuf,
    message_id: &str,
    text: &str,
    model: Option<String>,
    label: Option<String>,
    prefix: Option<String>,
) -> String {
    let mut store = match open_store(config, &file, model, label, prefix) {
        Ok(store) => store,
        Err(e) => return error_json(e),
    };

    let messages = store.messages().to_vec();
    let roots = build_tree(&messages);
    let mut thread = Thread::new();
    thread.enter_edit(message_id);

    let deps = RenderDeps::from_config(config);
    match thread.save(message_id, text, &roots, &messages, &mut store, &deps, &mut UuidIds) {
        Ok(true) => serde_json::to_string_pretty(&ApiResponse::ok(json!({
            "submission": store.take_submission(),
            "messages": store.messages(),
        })))
        .unwrap(),
        Ok(false) => error_json("Nothing to submit: edited text is empty"),
        Err(e) => error_json(e),
    }
}
