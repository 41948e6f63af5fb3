use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use replan::config::ReplanConfig;
use replan::host::HostOptions;
use replan::logging::{LogTarget, init_logging};

use crate::Commands;

#[derive(Parser)]
#[command(name = "replan")]
#[command(about = "Interactive rebase plan editor", long_about = None)]
pub(crate) struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Append every message exchanged with the host to a JSONL file
    #[arg(long, value_name = "PATH", global = true)]
    trace: Option<PathBuf>,

    /// Write logs to this file (overrides config)
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every subcommand once config and flags are merged.
pub(crate) struct RunContext {
    pub(crate) config: ReplanConfig,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) trace: Option<PathBuf>,
}

impl RunContext {
    pub(crate) fn host_options(&self) -> HostOptions {
        HostOptions::from_config(&self.config, self.config_path.clone())
    }
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.trace.is_some() && !matches!(cli.command, Commands::Edit { .. }) {
        anyhow::bail!("`--trace` is only supported by `replan edit`");
    }

    let config_path = cli.config.clone().or_else(ReplanConfig::default_path);
    let config = ReplanConfig::load(config_path.as_deref()).context("load config")?;

    let log_file = cli.log_file.clone().or_else(|| config.log_file.clone());
    let target = match (&cli.command, log_file) {
        (_, Some(path)) => LogTarget::File(path),
        // stdout carries protocol traffic, so logs go to stderr.
        (Commands::Serve { .. }, None) => LogTarget::Stderr,
        // The editor owns the terminal.
        (Commands::Edit { .. }, None) => LogTarget::Discard,
        (Commands::Show { .. }, None) => LogTarget::Stderr,
    };
    init_logging(target, config.log_level.as_deref());

    let ctx = RunContext {
        config,
        config_path,
        trace: cli.trace,
    };

    match cli.command {
        Commands::Edit { todo } => crate::cli_exec::handle_edit(&todo, &ctx),
        Commands::Serve { todo } => crate::cli_exec::handle_serve(&todo, &ctx),
        Commands::Show {
            todo,
            json,
            ascending,
        } => crate::cli_exec::handle_show(&todo, json, ascending, &ctx),
    }
}
