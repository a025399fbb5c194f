//! # Tree Comparator
//!
//! Finds the smallest changed subtrees between two versions of the same
//! document. Comparison walks both trees in lock-step, pre-order and
//! left-to-right, and stops descending as soon as a pair of nodes is equal
//! (attribute order does not count as a difference).
//!
//! In [`CompareMode::Aligned`] an element pair whose tag or attributes
//! differ is treated like a leaf, and a pair whose child lists differ in
//! length is recorded as a whole.
//!
//! When a walk reaches a pair it cannot descend into (two text runs, an
//! element facing a text run, ...) the *parents* of that pair are recorded.
//! Recording the parent rather than the leaf gives the applier an element
//! with a tag and attributes to match on in other documents.

use cascade_tree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How child lists of different lengths are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// An element whose child count changed is recorded as a whole, and an
    /// element whose tag or attributes changed is treated like a leaf.
    #[default]
    Aligned,

    /// Zip children by position and silently drop whatever is left over in
    /// the longer list. Tag and attribute changes on an element whose
    /// children are unchanged go unreported.
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Content under the recorded element differs
    Modified,
    /// The recorded element gained trailing children
    ChildrenAdded,
    /// The recorded element lost trailing children
    ChildrenRemoved,
}

/// One changed subtree: the old element and what replaces it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub old: Node,
    pub new: Node,
}

impl ChangeRecord {
    pub fn new(kind: ChangeKind, old: Node, new: Node) -> Self {
        Self { kind, old, new }
    }

    pub fn modified(old: Node, new: Node) -> Self {
        Self::new(ChangeKind::Modified, old, new)
    }
}

/// Change records of one comparison, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub records: Vec<ChangeRecord>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter()
    }

    /// Old side of every record, aligned with [`ChangeSet::new_nodes`]
    pub fn old_nodes(&self) -> Vec<&Node> {
        self.records.iter().map(|r| &r.old).collect()
    }

    pub fn new_nodes(&self) -> Vec<&Node> {
        self.records.iter().map(|r| &r.new).collect()
    }

    fn push(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }
}

/// Compare the `<body>` of two documents.
///
/// A missing body on either side yields an empty change set: there is
/// nothing to propagate rather than something that failed.
pub fn compare_documents(old: &Document, new: &Document, mode: CompareMode) -> ChangeSet {
    match (old.body(), new.body()) {
        (Some(old_body), Some(new_body)) => compare(old_body, new_body, mode),
        _ => {
            debug!("body missing on one side, nothing to compare");
            ChangeSet::new()
        }
    }
}

/// Compare two versions of the same root container
pub fn compare(old_root: &Node, new_root: &Node, mode: CompareMode) -> ChangeSet {
    let mut changes = ChangeSet::new();
    let mut walker = Walker {
        mode,
        changes: &mut changes,
        last_recorded: None,
    };
    walker.walk(old_root, new_root, None);
    changes
}

struct Walker<'a, 'n> {
    mode: CompareMode,
    changes: &'a mut ChangeSet,
    /// Old-side parent of the most recent `Modified` record. Several leaf
    /// mismatches under the same parent record it once; equal-valued
    /// parents elsewhere in the tree are distinct and recorded again.
    last_recorded: Option<&'n Node>,
}

impl<'n> Walker<'_, 'n> {
    /// `parents` is the pair of elements that own `old` and `new`; `None`
    /// only for the roots.
    fn walk(&mut self, old: &'n Node, new: &'n Node, parents: Option<(&'n Node, &'n Node)>) {
        if old.same_structure(new) {
            return;
        }

        match (old, new) {
            (
                Node::Element {
                    children: old_children,
                    ..
                },
                Node::Element {
                    children: new_children,
                    ..
                },
            ) => {
                if self.mode == CompareMode::Aligned {
                    let same_attributes = match (old.attributes(), new.attributes()) {
                        (Some(a), Some(b)) => a.same_set(b),
                        _ => false,
                    };
                    if old.tag() != new.tag() || !same_attributes {
                        self.record_parents(old, new, parents);
                        return;
                    }
                    if old_children.len() != new_children.len() {
                        let kind = if new_children.len() > old_children.len() {
                            ChangeKind::ChildrenAdded
                        } else {
                            ChangeKind::ChildrenRemoved
                        };
                        self.changes
                            .push(ChangeRecord::new(kind, old.clone(), new.clone()));
                        return;
                    }
                }

                for (old_child, new_child) in old_children.iter().zip(new_children.iter()) {
                    self.walk(old_child, new_child, Some((old, new)));
                }
            }
            _ => self.record_parents(old, new, parents),
        }
    }

    fn record_parents(
        &mut self,
        old: &'n Node,
        new: &'n Node,
        parents: Option<(&'n Node, &'n Node)>,
    ) {
        let (old_parent, new_parent) = parents.unwrap_or((old, new));
        if self
            .last_recorded
            .is_some_and(|last| std::ptr::eq(last, old_parent))
        {
            return;
        }
        self.last_recorded = Some(old_parent);
        self.changes.push(ChangeRecord::modified(
            old_parent.clone(),
            new_parent.clone(),
        ));
    }
}
