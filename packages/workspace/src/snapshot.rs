//! # Snapshot Store
//!
//! Every document has a baseline sibling (`resume.html` → `resume_old.html`)
//! holding the content the last propagation started from. The pair
//! (baseline, current) is what the comparator diffs; committing copies the
//! current content over the baseline so the next cycle starts from zero.

use crate::storage::Storage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASELINE_SUFFIX: &str = "_old";

#[derive(Error, Debug)]
pub enum SnapshotError {
    /// First sighting of a document: there is nothing to diff against yet
    #[error("No baseline for {}", path.display())]
    NoBaseline { path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SnapshotError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Naming convention for baseline files: the suffix goes between the file
/// stem and its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineNaming {
    suffix: String,
}

impl BaselineNaming {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn baseline_path(&self, doc: &Path) -> PathBuf {
        let stem = doc
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match doc.extension() {
            Some(ext) => format!("{}{}.{}", stem, self.suffix, ext.to_string_lossy()),
            None => format!("{}{}", stem, self.suffix),
        };
        doc.with_file_name(name)
    }

    pub fn is_baseline(&self, path: &Path) -> bool {
        !self.suffix.is_empty()
            && path
                .file_stem()
                .map(|stem| stem.to_string_lossy().ends_with(&self.suffix))
                .unwrap_or(false)
    }
}

impl Default for BaselineNaming {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_SUFFIX)
    }
}

/// Previous (baseline) and current content of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPair {
    pub previous: String,
    pub current: String,
}

impl SnapshotPair {
    pub fn is_unchanged(&self) -> bool {
        self.previous == self.current
    }
}

pub struct SnapshotStore<S> {
    storage: S,
    naming: BaselineNaming,
}

impl<S: Storage> SnapshotStore<S> {
    pub fn new(storage: S, naming: BaselineNaming) -> Self {
        Self { storage, naming }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn naming(&self) -> &BaselineNaming {
        &self.naming
    }

    pub fn read_current(&self, doc: &Path) -> Result<String, SnapshotError> {
        self.storage
            .read(doc)
            .map_err(|err| SnapshotError::io(doc, err))
    }

    /// Read baseline and current content.
    ///
    /// A missing baseline is reported as [`SnapshotError::NoBaseline`]; any
    /// other failure, including a missing document, is an I/O error.
    pub fn read_pair(&self, doc: &Path) -> Result<SnapshotPair, SnapshotError> {
        let current = self.read_current(doc)?;
        let baseline = self.naming.baseline_path(doc);
        let previous = match self.storage.read(&baseline) {
            Ok(previous) => previous,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SnapshotError::NoBaseline {
                    path: doc.to_path_buf(),
                })
            }
            Err(err) => return Err(SnapshotError::io(&baseline, err)),
        };
        Ok(SnapshotPair { previous, current })
    }

    /// Copy the document's current content over its baseline.
    pub fn commit(&self, doc: &Path) -> Result<(), SnapshotError> {
        let current = self.read_current(doc)?;
        self.commit_content(doc, &current)
    }

    /// Make `content` the baseline, for callers that already hold what they
    /// propagated from.
    pub fn commit_content(&self, doc: &Path, content: &str) -> Result<(), SnapshotError> {
        let baseline = self.naming.baseline_path(doc);
        self.storage
            .write(&baseline, content)
            .map_err(|err| SnapshotError::io(&baseline, err))
    }

    pub fn write_document(&self, doc: &Path, content: &str) -> Result<(), SnapshotError> {
        self.storage
            .write(doc, content)
            .map_err(|err| SnapshotError::io(doc, err))
    }

    pub fn has_baseline(&self, doc: &Path) -> bool {
        self.storage.exists(&self.naming.baseline_path(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> SnapshotStore<MemoryStorage> {
        SnapshotStore::new(MemoryStorage::new(), BaselineNaming::default())
    }

    #[test]
    fn test_baseline_path_inserts_suffix_before_extension() {
        let naming = BaselineNaming::default();
        assert_eq!(
            naming.baseline_path(Path::new("/root/a/resume.html")),
            PathBuf::from("/root/a/resume_old.html")
        );
        assert_eq!(
            naming.baseline_path(Path::new("notes")),
            PathBuf::from("notes_old")
        );
    }

    #[test]
    fn test_is_baseline() {
        let naming = BaselineNaming::default();
        assert!(naming.is_baseline(Path::new("/x/resume_old.html")));
        assert!(!naming.is_baseline(Path::new("/x/resume.html")));
        assert!(!BaselineNaming::new("").is_baseline(Path::new("/x/resume.html")));
    }

    #[test]
    fn test_missing_baseline_is_distinct_from_io_error() {
        let store = store();
        store.storage().insert("/r/resume.html", "<p>a</p>");

        match store.read_pair(Path::new("/r/resume.html")) {
            Err(SnapshotError::NoBaseline { path }) => {
                assert_eq!(path, PathBuf::from("/r/resume.html"))
            }
            other => panic!("expected NoBaseline, got {:?}", other),
        }

        match store.read_pair(Path::new("/r/missing.html")) {
            Err(SnapshotError::Io { .. }) => {}
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_commit_collapses_pair() {
        let store = store();
        let doc = Path::new("/r/resume.html");
        store.storage().insert(doc, "v2");
        store.storage().insert("/r/resume_old.html", "v1");

        let pair = store.read_pair(doc).unwrap();
        assert_eq!(pair.previous, "v1");
        assert_eq!(pair.current, "v2");
        assert!(!pair.is_unchanged());

        store.commit(doc).unwrap();

        let pair = store.read_pair(doc).unwrap();
        assert!(pair.is_unchanged());
        assert_eq!(pair.previous, "v2");
    }

    #[test]
    fn test_commit_content_uses_given_text() {
        let store = store();
        let doc = Path::new("/r/resume.html");
        store.storage().insert(doc, "on disk");

        store.commit_content(doc, "propagated").unwrap();

        assert!(store.has_baseline(doc));
        assert_eq!(
            store.storage().get(Path::new("/r/resume_old.html")).as_deref(),
            Some("propagated")
        );
    }
}
