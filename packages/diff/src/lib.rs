pub mod applier;
pub mod comparator;

pub use applier::{apply, apply_record, find_match, ApplyOutcome};
pub use comparator::{
    compare, compare_documents, ChangeKind, ChangeRecord, ChangeSet, CompareMode,
};
