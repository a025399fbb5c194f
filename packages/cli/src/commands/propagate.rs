use super::{document_dir, resolve, ConfigArgs};
use anyhow::{anyhow, Result};
use cascade_workspace::{CycleOutcome, DiskOrchestrator};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct PropagateArgs {
    /// Master document whose edits are pushed to its children
    pub master: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn propagate(args: PropagateArgs, cwd: &Path) -> Result<()> {
    let master = resolve(cwd, &args.master);
    if !master.is_file() {
        return Err(anyhow!("Document does not exist: {}", master.display()));
    }

    let dir = document_dir(&master);
    let config = args.config.load(dir)?;
    let orchestrator = DiskOrchestrator::on_disk(config.orchestrator_config());

    let report = orchestrator.propagate(&master)?;
    let relative = |path: &Path| path.strip_prefix(dir).unwrap_or(path).display().to_string();

    match report.outcome {
        CycleOutcome::BaselineEstablished => {
            println!(
                "{} No baseline yet, recorded current content of {}",
                "•".bright_blue(),
                master.display()
            );
            return Ok(());
        }
        CycleOutcome::Unchanged | CycleOutcome::NoStructuralChanges => {
            println!("{}", "Nothing to propagate".dimmed());
            return Ok(());
        }
        CycleOutcome::Propagated => {}
    }

    println!(
        "{}",
        format!("🔁 Propagating {} change(s)...", report.records)
            .bright_blue()
            .bold()
    );
    for path in &report.updated {
        println!("  {} {}", "✓".green(), relative(path));
    }
    for path in &report.unchanged {
        println!("  {} {}", "·".dimmed(), relative(path).dimmed());
    }
    for failure in &report.failures {
        eprintln!(
            "  {} {} - {}",
            "✗".red(),
            relative(&failure.path),
            failure.error.to_string().red()
        );
    }

    println!();
    if report.is_clean() {
        println!(
            "{} Updated {} document(s), {} left as they were",
            "✅".green(),
            report.updated.len(),
            report.unchanged.len()
        );
        Ok(())
    } else {
        Err(anyhow!(
            "{} document(s) could not be updated",
            report.failures.len()
        ))
    }
}
