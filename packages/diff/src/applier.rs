//! # Change Applier
//!
//! Replays a master's change records onto a document that shares the
//! master's original structure but may have been edited on its own.
//!
//! For every record, in order:
//! 1. collect elements with the record's tag and the exact same attribute
//!    set (attribute order is irrelevant);
//! 2. take the first, in document order, whose text content equals the
//!    record's old text;
//! 3. splice the record's new node into that position.
//!
//! A record with no such element is skipped. That is the only protection
//! for content the document's own author changed: an element whose text no
//! longer matches the master's old text is never touched.

use crate::comparator::{ChangeRecord, ChangeSet};
use cascade_tree::{Document, Node, NodePath};
use tracing::{debug, trace};

/// Result of applying a change set to one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Records that replaced a node
    pub applied: usize,
    /// Records with no matching node
    pub skipped: usize,
}

impl ApplyOutcome {
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Apply every record of `changes` to `doc`, first match wins per record.
pub fn apply(doc: &mut Document, changes: &ChangeSet) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    for (index, record) in changes.iter().enumerate() {
        if apply_record(doc, record) {
            outcome.applied += 1;
        } else {
            debug!(
                record = index,
                tag = record.old.tag().unwrap_or("#text"),
                "no node matches the old content, leaving document as is"
            );
            outcome.skipped += 1;
        }
    }

    outcome
}

/// Apply a single record; returns whether a node was replaced.
pub fn apply_record(doc: &mut Document, record: &ChangeRecord) -> bool {
    match find_match(doc, &record.old) {
        Some(path) => {
            trace!(?path, "replacing matched node");
            doc.replace_at(&path, record.new.clone());
            true
        }
        None => false,
    }
}

/// Path of the first node matching `old` by tag, attribute set and text.
pub fn find_match(doc: &Document, old: &Node) -> Option<NodePath> {
    let old_text = old.text_content();
    doc.find_first(|candidate| matches_node(candidate, old, &old_text))
}

fn matches_node(candidate: &Node, old: &Node, old_text: &str) -> bool {
    match old {
        Node::Element { .. } => candidate.same_shape(old) && candidate.text_content() == old_text,
        // Records only carry non-elements when the compared roots themselves
        // were leaves; those match by value.
        _ => candidate == old,
    }
}
