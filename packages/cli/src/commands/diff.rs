use super::{document_dir, resolve, ConfigArgs};
use anyhow::{anyhow, Result};
use cascade_diff::ChangeKind;
use cascade_tree::serialize_node;
use cascade_workspace::DiskOrchestrator;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Master document to compare against its baseline
    pub master: PathBuf,

    /// Print the change records as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn diff(args: DiffArgs, cwd: &Path) -> Result<()> {
    let master = resolve(cwd, &args.master);
    if !master.is_file() {
        return Err(anyhow!("Document does not exist: {}", master.display()));
    }

    let config = args.config.load(document_dir(&master))?;
    let orchestrator = DiskOrchestrator::on_disk(config.orchestrator_config());
    if !orchestrator.snapshots().has_baseline(&master) && !args.json {
        println!(
            "{} No baseline yet for {}; run `cascade baseline` first",
            "•".bright_blue(),
            master.display()
        );
        return Ok(());
    }
    let changes = orchestrator.diff(&master)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
        return Ok(());
    }

    if changes.is_empty() {
        println!("{}", "No changes".dimmed());
        return Ok(());
    }

    for (i, record) in changes.iter().enumerate() {
        let label = match record.kind {
            ChangeKind::Modified => "modified".yellow(),
            ChangeKind::ChildrenAdded => "children added".green(),
            ChangeKind::ChildrenRemoved => "children removed".red(),
        };
        println!("{} {}", format!("#{}", i + 1).bold(), label);
        println!("  {} {}", "-".red(), serialize_node(&record.old).red());
        println!("  {} {}", "+".green(), serialize_node(&record.new).green());
    }

    Ok(())
}
