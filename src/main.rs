use std::path::PathBuf;

use clap::Subcommand;

mod cli_exec;
mod cli_runtime;

#[derive(Subcommand)]
enum Commands {
    /// Edit a rebase todo file interactively (use as git's sequence.editor)
    Edit {
        /// Path to git-rebase-todo
        todo: PathBuf,
    },

    /// Serve the plan host as JSON lines on stdin/stdout
    Serve {
        /// Path to git-rebase-todo
        todo: PathBuf,
    },

    /// Print the plan in display order with derived flags
    Show {
        /// Path to git-rebase-todo
        todo: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
        /// Oldest entry first (overrides config)
        #[arg(long)]
        ascending: bool,
    },
}

fn main() {
    if let Err(err) = cli_runtime::run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
