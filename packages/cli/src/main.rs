mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{baseline, diff, propagate, watch, BaselineArgs, DiffArgs, PropagateArgs, WatchArgs};
use tracing_subscriber::EnvFilter;

/// Cascade - push edits of a master HTML document down to its copies
#[derive(Parser, Debug)]
#[command(name = "cascade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every change record and child update
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch a directory tree and propagate every master edit
    Watch(WatchArgs),

    /// Run one propagation cycle for a master document
    Propagate(PropagateArgs),

    /// Show what a propagation would push, without writing anything
    Diff(DiffArgs),

    /// Record a document's current content as its baseline
    Baseline(BaselineArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cascade=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cascade=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Watch(args) => watch(args, &cwd),
            Command::Propagate(args) => propagate(args, &cwd),
            Command::Diff(args) => diff(args, &cwd),
            Command::Baseline(args) => baseline(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
