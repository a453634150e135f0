//! `cwtrack` command line entry point.
//!
//! # Responsibility
//! - Resolve configuration from file, environment and flags.
//! - Replay compliance history files through the core service.

mod cli;
mod history;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, OutputFormat, ReplayArgs};
use cwtrack_core::{init_logging, AdjustmentPolicy, CoreConfig};
use history::{render_text, replay, HistoryFile};
use log::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(args),
        Command::Version => {
            println!("cwtrack {}", env!("CARGO_PKG_VERSION"));
            println!("cwtrack_core {}", cwtrack_core::core_version());
            Ok(())
        }
    }
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let mut config = CoreConfig::resolve(args.config.as_deref()).context("loading config")?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(dir) = args.log_dir {
        config.logging.dir = Some(dir);
    }
    if let Some(policy) = args.adjustment_policy {
        config.engine.adjustment_policy = policy
            .parse::<AdjustmentPolicy>()
            .context("--adjustment-policy")?;
    }

    if let Some(dir) = config.logging.dir.as_deref() {
        init_logging(&config.logging.level, dir).context("initializing logging")?;
    }

    let history = HistoryFile::load(&args.file)?;
    let report = replay(history, config.engine)?;
    info!(
        "event=history_replay module=cli status=ok task_code={} compliances={} policy={}",
        report.task_code,
        report.rows.len(),
        config.engine.adjustment_policy.as_str()
    );

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        ),
    }
    Ok(())
}
