use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::process;
use vblkpurge_lib::progress::no_op_progress_callback;
use vblkpurge_lib::{PurgeReport, Purger, SystemRunner};

mod cli;
mod config;
mod progress;

use cli::{Cli, merge_config};
use config::PurgeToolConfig;

fn print_summary(report: &PurgeReport) {
    println!(
        "{}: {} blocks, {} erased, {} failed, {} skipped{}",
        report.device,
        report.total_blocks,
        report.erased(),
        report.failed(),
        report.skipped(),
        if report.dry_run { " (dry run)" } else { "" }
    );
    println!("Backup: {}", report.backup.display());
}

fn run(args: Cli) -> Result<()> {
    let config = match args.config.as_deref() {
        Some(path) => {
            let config = PurgeToolConfig::from_file(path)
                .map_err(|e| anyhow!("Failed to load config file '{}': {}", path, e))?;
            config
                .validate()
                .map_err(|e| anyhow!("Invalid config file '{}': {}", path, e))?;
            Some(config)
        }
        None => None,
    };

    let merged = merge_config(&args, config)?;
    let callback = if merged.quiet {
        no_op_progress_callback()
    } else {
        progress::create_progress_callback()
    };

    let mpath = merged.purge.mpath.clone();
    let report = Purger::new(merged.purge, SystemRunner)
        .progress(callback)
        .run()
        .with_context(|| format!("Failed to purge blocks listed in {}", mpath.display()))?;

    if !merged.quiet {
        print_summary(&report);
    }
    Ok(())
}

fn main() {
    // Log level can be controlled by setting the RUST_LOG environment variable, e.g.:
    // RUST_LOG=debug, RUST_LOG=vblkpurge_lib=trace, RUST_LOG=info
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
