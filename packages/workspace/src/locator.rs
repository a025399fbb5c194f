use crate::snapshot::BaselineNaming;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds the documents that inherit from a master document
pub trait DocumentLocator: Send + Sync {
    /// Every descendant document of `master`, sorted by path.
    fn find_children(&self, master: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Locates children by directory nesting: every file named like the
/// master anywhere below a subdirectory of the master's directory.
#[derive(Debug, Clone)]
pub struct WalkDirLocator {
    document_name: String,
    naming: BaselineNaming,
}

impl WalkDirLocator {
    pub fn new(document_name: impl Into<String>, naming: BaselineNaming) -> Self {
        Self {
            document_name: document_name.into(),
            naming,
        }
    }

    fn is_document(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy() == self.document_name.as_str())
            .unwrap_or(false)
            && !self.naming.is_baseline(path)
    }
}

impl DocumentLocator for WalkDirLocator {
    fn find_children(&self, master: &Path) -> io::Result<Vec<PathBuf>> {
        let parent_dir = match master.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut children = Vec::new();
        for entry in fs::read_dir(parent_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            children.extend(
                WalkDir::new(entry.path())
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_file())
                    .map(|entry| entry.into_path())
                    .filter(|path| self.is_document(path)),
            );
        }

        children.sort();
        Ok(children)
    }
}
