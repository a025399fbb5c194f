//! # Propagation Orchestrator
//!
//! One propagation cycle, run when a master document is written:
//!
//! ```text
//! read pair → parse → compare → locate children → apply per child → commit master
//!     │                                               │
//!     └─ no baseline: commit one, stop                └─ write child, commit child
//! ```
//!
//! Failures on a child are recorded in the report and the cycle moves on to
//! the next document; only a failure on the master itself aborts a cycle.

use crate::family::Family;
use crate::locator::DocumentLocator;
use crate::snapshot::{BaselineNaming, SnapshotError, SnapshotStore};
use crate::storage::Storage;
use cascade_diff::{apply, compare_documents, ApplyOutcome, ChangeSet, CompareMode};
use cascade_tree::{parse, serialize, ParseError};
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_DOCUMENT_NAME: &str = "resume.html";

#[derive(Error, Debug)]
pub enum PropagationError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to list child documents of {}: {source}", path.display())]
    Locate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// File name shared by master and child documents
    pub document_name: String,
    pub naming: BaselineNaming,
    pub compare_mode: CompareMode,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            naming: BaselineNaming::default(),
            compare_mode: CompareMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The master had no baseline; one was written and nothing propagated
    BaselineEstablished,
    /// Baseline and current content were identical
    Unchanged,
    /// Content differed but no structural change was found in the body
    NoStructuralChanges,
    /// Change records were applied to the family
    Propagated,
}

/// A child that could not be updated during a cycle
#[derive(Debug)]
pub struct ChildFailure {
    pub path: PathBuf,
    pub error: PropagationError,
}

#[derive(Debug)]
pub struct PropagationReport {
    pub master: PathBuf,
    pub outcome: CycleOutcome,
    pub started_at: DateTime<Utc>,
    /// Number of change records found in the master
    pub records: usize,
    /// Children rewritten with at least one applied record
    pub updated: Vec<PathBuf>,
    /// Children where no record matched; left as they were
    pub unchanged: Vec<PathBuf>,
    pub failures: Vec<ChildFailure>,
}

impl PropagationReport {
    fn new(master: &Path, outcome: CycleOutcome, started_at: DateTime<Utc>) -> Self {
        Self {
            master: master.to_path_buf(),
            outcome,
            started_at,
            records: 0,
            updated: Vec::new(),
            unchanged: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs propagation cycles; owns its collaborators and no global state.
pub struct Orchestrator<S, L> {
    snapshots: SnapshotStore<S>,
    locator: L,
    config: OrchestratorConfig,
}

impl<S: Storage, L: DocumentLocator> Orchestrator<S, L> {
    pub fn new(storage: S, locator: L, config: OrchestratorConfig) -> Self {
        Self {
            snapshots: SnapshotStore::new(storage, config.naming.clone()),
            locator,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn snapshots(&self) -> &SnapshotStore<S> {
        &self.snapshots
    }

    /// Whether a change notification should start a cycle: regular files
    /// carrying the document name, never a baseline (committing a baseline
    /// would otherwise notify us again).
    pub fn accepts(&self, path: &Path, is_dir: bool) -> bool {
        if is_dir || self.config.naming.is_baseline(path) {
            return false;
        }
        path.file_name()
            .map(|name| name.to_string_lossy() == self.config.document_name.as_str())
            .unwrap_or(false)
    }

    /// Change records between the master's baseline and its current content,
    /// without touching anything. A master without baseline has none.
    pub fn diff(&self, master: &Path) -> Result<ChangeSet, PropagationError> {
        let pair = match self.snapshots.read_pair(master) {
            Ok(pair) => pair,
            Err(SnapshotError::NoBaseline { .. }) => return Ok(ChangeSet::new()),
            Err(err) => return Err(err.into()),
        };
        let old = parse_document(master, &pair.previous)?;
        let new = parse_document(master, &pair.current)?;
        Ok(compare_documents(&old, &new, self.config.compare_mode))
    }

    /// Make the document's current content its baseline.
    pub fn establish_baseline(&self, doc: &Path) -> Result<(), PropagationError> {
        self.snapshots.commit(doc)?;
        Ok(())
    }

    /// Run one propagation cycle for `master`.
    pub fn propagate(&self, master: &Path) -> Result<PropagationReport, PropagationError> {
        let started_at = Utc::now();

        let pair = match self.snapshots.read_pair(master) {
            Ok(pair) => pair,
            Err(SnapshotError::NoBaseline { .. }) => {
                self.snapshots.commit(master)?;
                info!(master = %master.display(), "baseline established");
                return Ok(PropagationReport::new(
                    master,
                    CycleOutcome::BaselineEstablished,
                    started_at,
                ));
            }
            Err(err) => return Err(err.into()),
        };

        if pair.is_unchanged() {
            debug!(master = %master.display(), "content matches baseline");
            return Ok(PropagationReport::new(
                master,
                CycleOutcome::Unchanged,
                started_at,
            ));
        }

        let old = parse_document(master, &pair.previous)?;
        let new = parse_document(master, &pair.current)?;
        let changes = compare_documents(&old, &new, self.config.compare_mode);

        if changes.is_empty() {
            self.snapshots.commit_content(master, &pair.current)?;
            debug!(master = %master.display(), "no structural changes in body");
            return Ok(PropagationReport::new(
                master,
                CycleOutcome::NoStructuralChanges,
                started_at,
            ));
        }

        let descendants = self
            .locator
            .find_children(master)
            .map_err(|source| PropagationError::Locate {
                path: master.to_path_buf(),
                source,
            })?;
        let family = Family::build(master, descendants);

        let mut report = PropagationReport::new(master, CycleOutcome::Propagated, started_at);
        report.records = changes.len();

        debug!(
            master = %master.display(),
            documents = family.len(),
            "propagating to family"
        );
        for child in family.visit_order() {
            self.propagate_to(child, &changes, &mut report);
        }

        // Commit what was diffed, not a fresh read: an edit landing mid-cycle
        // stays visible to the next cycle.
        self.snapshots.commit_content(master, &pair.current)?;

        info!(
            master = %master.display(),
            records = report.records,
            updated = report.updated.len(),
            unchanged = report.unchanged.len(),
            failed = report.failures.len(),
            elapsed_ms = (Utc::now() - started_at).num_milliseconds(),
            "propagation finished"
        );

        Ok(report)
    }

    fn propagate_to(&self, path: &Path, changes: &ChangeSet, report: &mut PropagationReport) {
        match self.update_child(path, changes) {
            Ok(outcome) if outcome.changed() => {
                debug!(
                    child = %path.display(),
                    applied = outcome.applied,
                    skipped = outcome.skipped,
                    "child updated"
                );
                report.updated.push(path.to_path_buf());
            }
            Ok(_) => report.unchanged.push(path.to_path_buf()),
            Err(error) => {
                warn!(child = %path.display(), %error, "skipping child");
                report.failures.push(ChildFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    /// Apply `changes` to one document, write it back if anything matched,
    /// then commit its baseline.
    fn update_child(
        &self,
        path: &Path,
        changes: &ChangeSet,
    ) -> Result<ApplyOutcome, PropagationError> {
        let source = self.snapshots.read_current(path)?;
        let mut doc = parse_document(path, &source)?;

        let outcome = apply(&mut doc, changes);
        let content = if outcome.changed() {
            let content = serialize(&doc);
            self.snapshots.write_document(path, &content)?;
            content
        } else {
            source
        };

        self.snapshots.commit_content(path, &content)?;
        Ok(outcome)
    }
}

fn parse_document(path: &Path, source: &str) -> Result<cascade_tree::Document, PropagationError> {
    parse(source).map_err(|source| PropagationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
