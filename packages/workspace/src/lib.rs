pub mod events;
pub mod family;
pub mod locator;
pub mod orchestrator;
pub mod snapshot;
pub mod storage;
pub mod watch;
pub mod watcher;

pub use events::{EventQueue, DEFAULT_DEBOUNCE};
pub use family::{Family, FamilyNode};
pub use locator::{DocumentLocator, WalkDirLocator};
pub use orchestrator::{
    ChildFailure, CycleOutcome, Orchestrator, OrchestratorConfig, PropagationError,
    PropagationReport, DEFAULT_DOCUMENT_NAME,
};
pub use snapshot::{
    BaselineNaming, SnapshotError, SnapshotPair, SnapshotStore, DEFAULT_BASELINE_SUFFIX,
};
pub use storage::{DiskStorage, MemoryStorage, Storage};
pub use watch::run_watch_loop;
pub use watcher::{FileWatcher, WatchEvent, WatcherError, WatcherResult};

/// Orchestrator over the real file system with directory-nesting discovery
pub type DiskOrchestrator = Orchestrator<DiskStorage, WalkDirLocator>;

impl DiskOrchestrator {
    pub fn on_disk(config: OrchestratorConfig) -> Self {
        let locator = WalkDirLocator::new(config.document_name.clone(), config.naming.clone());
        Orchestrator::new(DiskStorage, locator, config)
    }
}
