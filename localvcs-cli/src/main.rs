//! LocalVcs command-line tool

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "localvcs")]
#[command(author = "LocalVcs Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Local version history: commit, revert and label tracked entries")]
struct Cli {
    /// Repository directory
    #[arg(short, long, global = true, default_value = ".localvcs")]
    repo: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new repository
    Init,

    /// Track a new entry
    Add { path: String, content: String },

    /// Replace the content of a tracked entry
    Change { path: String, content: String },

    /// Stop tracking an entry
    Rm { path: String },

    /// Record the working tree as a new snapshot
    Commit,

    /// Discard pending edits, or undo the last commit when there are none
    Revert,

    /// Label the latest snapshot
    Label { name: String },

    /// List labels
    Labels,

    /// Show history, newest first
    Log,

    /// Show a snapshot, or one entry's content within it
    Show {
        #[arg(short, long, conflicts_with = "index")]
        label: Option<String>,
        /// Position in history, 0 being the newest
        #[arg(short, long)]
        index: Option<usize>,
        path: Option<String>,
    },

    /// Show pending changes against the latest snapshot
    Status,

    /// Print the current content of an entry
    Cat { path: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::WARN.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    debug!("Repository: {:?}, command: {:?}", cli.repo, cli.command);

    let repo = cli.repo.as_path();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Init => commands::cmd_init(repo, &mut out),
        Commands::Add { path, content } => commands::cmd_add(repo, &path, &content, &mut out),
        Commands::Change { path, content } => {
            commands::cmd_change(repo, &path, &content, &mut out)
        }
        Commands::Rm { path } => commands::cmd_remove(repo, &path, &mut out),
        Commands::Commit => commands::cmd_commit(repo, &mut out),
        Commands::Revert => commands::cmd_revert(repo, &mut out),
        Commands::Label { name } => commands::cmd_label(repo, &name, &mut out),
        Commands::Labels => commands::cmd_labels(repo, &mut out),
        Commands::Log => commands::cmd_log(repo, &mut out),
        Commands::Show { label, index, path } => commands::cmd_show(
            repo,
            label.as_deref(),
            index,
            path.as_deref(),
            &mut out,
        ),
        Commands::Status => commands::cmd_status(repo, &mut out),
        Commands::Cat { path } => commands::cmd_cat(repo, &path, &mut out),
    }
}
