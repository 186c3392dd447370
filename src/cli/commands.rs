use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "thoughtsort", version, about = "Thought Sort notes server and dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve,

    /// Manage notes on a running server
    Notes {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Open the interactive chat dashboard
    Chat {
        /// Start with this note selected
        #[arg(short, long)]
        note: Option<Uuid>,
    },
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// List notes, newest first
    List {
        /// Only show notes whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a note with its summary
    Show { id: Uuid },

    /// Create a note; the server adds a summary and an icon
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short = 'b', long)]
        content: String,
    },

    /// Delete a note
    Delete { id: Uuid },

    /// Regenerate a note's summary
    Summarize { id: Uuid },
}
