use super::{resolve, ConfigArgs};
use anyhow::{anyhow, Context, Result};
use cascade_workspace::{run_watch_loop, DiskOrchestrator, EventQueue, FileWatcher};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Directory tree to watch (defaults to current directory)
    #[arg(default_value = ".")]
    pub root: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn watch(args: WatchArgs, cwd: &Path) -> Result<()> {
    let root = resolve(cwd, &args.root);
    if !root.is_dir() {
        return Err(anyhow!("Watch root is not a directory: {}", root.display()));
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("Cannot resolve {}", root.display()))?;

    let config = args.config.load(&root)?;
    let orchestrator = Arc::new(DiskOrchestrator::on_disk(config.orchestrator_config()));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (watcher, rx) = FileWatcher::new(root)?;

        println!(
            "{} {} in {}",
            "👀 Watching".bright_blue().bold(),
            config.document_name,
            watcher.root().display()
        );
        println!("{}", "(Ctrl-C to stop)".dimmed());

        let shutdown = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };
        run_watch_loop(orchestrator, EventQueue::new(rx, config.debounce()), shutdown).await;

        drop(watcher);
        Ok::<_, anyhow::Error>(())
    })?;

    println!("{}", "Stopped".dimmed());
    Ok(())
}
