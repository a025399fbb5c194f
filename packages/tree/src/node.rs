use serde::{Deserialize, Serialize};

/// Index path from a root to a node: each entry is a child position.
///
/// Paths stand in for parent back-references, so ownership of children
/// always flows from parent to child.
pub type NodePath = Vec<usize>;

/// Ordered attribute list with unique names.
///
/// Equality through `PartialEq` is order-sensitive (two nodes are only equal
/// when their source is identical). Use [`Attributes::same_set`] for the
/// order-insensitive comparison used when matching nodes across documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert an attribute, keeping the first value when the name repeats.
    ///
    /// Returns `false` if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push((name, value.into()));
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact, order-insensitive set equality: same names with same values.
    pub fn same_set(&self, other: &Attributes) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

/// Node in a parsed document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// HTML element
    Element {
        tag: String,
        attributes: Attributes,
        children: Vec<Node>,
    },

    /// Text run, kept verbatim (entities are not decoded)
    Text { content: String },

    /// `<!-- ... -->`
    Comment { content: String },

    /// `<!DOCTYPE ...>`
    Doctype { content: String },
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Node::Text {
            content: content.into(),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Node::Comment {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(name, value);
        }
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        if let Node::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<Node>) -> Self {
        if let Node::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. })
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Node::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Child nodes; `None` for anything that is not an element.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Concatenation of every descendant text run in document order.
    /// Comments and doctypes contribute nothing.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { content } => out.push_str(content),
            Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::Comment { .. } | Node::Doctype { .. } => {}
        }
    }

    /// Tag and attribute set match, ignoring attribute order
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (
                Node::Element {
                    tag: a_tag,
                    attributes: a_attrs,
                    ..
                },
                Node::Element {
                    tag: b_tag,
                    attributes: b_attrs,
                    ..
                },
            ) => a_tag == b_tag && a_attrs.same_set(b_attrs),
            _ => false,
        }
    }

    /// Value equality with attribute order ignored at every level.
    ///
    /// Two versions of a document that differ only in how attributes are
    /// ordered are the same document for comparison purposes.
    pub fn same_structure(&self, other: &Node) -> bool {
        match (self, other) {
            (
                Node::Element {
                    children: a_children,
                    ..
                },
                Node::Element {
                    children: b_children,
                    ..
                },
            ) => {
                self.same_shape(other)
                    && a_children.len() == b_children.len()
                    && a_children
                        .iter()
                        .zip(b_children)
                        .all(|(a, b)| a.same_structure(b))
            }
            _ => self == other,
        }
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => self.children()?.get(*index)?.node_at(rest),
        }
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => self.children_mut()?.get_mut(*index)?.node_at_mut(rest),
        }
    }

    /// Swap the node at `path` for `node`, returning the node it displaced.
    pub fn replace_at(&mut self, path: &[usize], node: Node) -> Option<Node> {
        let target = self.node_at_mut(path)?;
        Some(std::mem::replace(target, node))
    }

    /// First node in pre-order (self included) satisfying `pred`.
    pub fn find_first<F>(&self, mut pred: F) -> Option<NodePath>
    where
        F: FnMut(&Node) -> bool,
    {
        let mut path = Vec::new();
        if self.find_first_inner(&mut pred, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn find_first_inner<F>(&self, pred: &mut F, path: &mut NodePath) -> bool
    where
        F: FnMut(&Node) -> bool,
    {
        if pred(self) {
            return true;
        }
        if let Node::Element { children, .. } = self {
            for (i, child) in children.iter().enumerate() {
                path.push(i);
                if child.find_first_inner(pred, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }
}

/// A parsed document: a forest of top-level nodes in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Path of the first `<body>` element in pre-order
    pub fn body_path(&self) -> Option<NodePath> {
        self.find_first(|node| node.tag() == Some("body"))
    }

    pub fn body(&self) -> Option<&Node> {
        let path = self.body_path()?;
        self.node_at(&path)
    }

    pub fn body_mut(&mut self) -> Option<&mut Node> {
        let path = self.body_path()?;
        self.node_at_mut(&path)
    }

    /// Paths here start with the index of a top-level node.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (root, rest) = path.split_first()?;
        self.nodes.get(*root)?.node_at(rest)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (root, rest) = path.split_first()?;
        self.nodes.get_mut(*root)?.node_at_mut(rest)
    }

    pub fn replace_at(&mut self, path: &[usize], node: Node) -> Option<Node> {
        let target = self.node_at_mut(path)?;
        Some(std::mem::replace(target, node))
    }

    pub fn find_first<F>(&self, mut pred: F) -> Option<NodePath>
    where
        F: FnMut(&Node) -> bool,
    {
        self.nodes.iter().enumerate().find_map(|(i, root)| {
            root.find_first(&mut pred).map(|mut path| {
                path.insert(0, i);
                path
            })
        })
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }
}
