use super::{document_dir, resolve, ConfigArgs};
use anyhow::{anyhow, Result};
use cascade_workspace::DiskOrchestrator;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct BaselineArgs {
    /// Document whose current content becomes its baseline
    pub document: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn baseline(args: BaselineArgs, cwd: &Path) -> Result<()> {
    let doc = resolve(cwd, &args.document);
    if !doc.is_file() {
        return Err(anyhow!("Document does not exist: {}", doc.display()));
    }

    let config = args.config.load(document_dir(&doc))?;
    let orchestrator = DiskOrchestrator::on_disk(config.orchestrator_config());
    orchestrator.establish_baseline(&doc)?;

    println!(
        "{} Baseline recorded at {}",
        "✓".green(),
        orchestrator
            .config()
            .naming
            .baseline_path(&doc)
            .display()
    );
    Ok(())
}
