pub mod baseline;
pub mod diff;
pub mod propagate;
pub mod watch;

pub use baseline::{baseline, BaselineArgs};
pub use diff::{diff, DiffArgs};
pub use propagate::{propagate, PropagateArgs};
pub use watch::{watch, WatchArgs};

use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

/// Flags that override `cascade.config.json`
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// File name shared by master and child documents
    #[arg(long)]
    pub document_name: Option<String>,

    /// Compare child lists by plain zip, ignoring trailing children
    #[arg(long)]
    pub truncate: bool,
}

impl ConfigArgs {
    /// Config from `dir` with these flags applied on top
    pub fn load(&self, dir: &Path) -> Result<Config> {
        let config = Config::load(dir)?;
        Ok(config.with_overrides(self.document_name.clone(), self.truncate))
    }
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Directory holding a document; its config applies to it
fn document_dir(doc: &Path) -> &Path {
    doc.parent().unwrap_or(Path::new("."))
}
