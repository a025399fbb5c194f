use crate::node::{Document, Node};
use crate::parser::is_void_element;

/// Serializer converts a node tree back to markup
///
/// Text is written verbatim, so anything the parser kept (whitespace,
/// entities) survives a round trip. Valueless attributes come out as
/// `name=""`.
pub struct Serializer {
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Serialize a Document to markup
    pub fn serialize(mut self, doc: &Document) -> String {
        for node in &doc.nodes {
            self.write_node(node);
        }
        self.output
    }

    /// Serialize a single subtree
    pub fn serialize_node(mut self, node: &Node) -> String {
        self.write_node(node);
        self.output
    }

    /// Double quotes unless the value itself contains one and no single
    /// quote; only values holding both kinds fall back to `&quot;`.
    fn write_attribute_value(&mut self, value: &str) {
        if value.contains('"') && !value.contains('\'') {
            self.output.push('\'');
            self.output.push_str(value);
            self.output.push('\'');
        } else {
            self.output.push('"');
            self.output.push_str(&value.replace('"', "&quot;"));
            self.output.push('"');
        }
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Element {
                tag,
                attributes,
                children,
            } => {
                self.output.push('<');
                self.output.push_str(tag);
                for (name, value) in attributes.iter() {
                    self.output.push(' ');
                    self.output.push_str(name);
                    self.output.push('=');
                    self.write_attribute_value(value);
                }
                self.output.push('>');

                if is_void_element(tag) {
                    return;
                }

                for child in children {
                    self.write_node(child);
                }

                self.output.push_str("</");
                self.output.push_str(tag);
                self.output.push('>');
            }
            Node::Text { content } => self.output.push_str(content),
            Node::Comment { content } => {
                self.output.push_str("<!--");
                self.output.push_str(content);
                self.output.push_str("-->");
            }
            Node::Doctype { content } => {
                self.output.push_str("<!DOCTYPE ");
                self.output.push_str(content);
                self.output.push('>');
            }
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a document to markup
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

/// Serialize one node (and its subtree) to markup
pub fn serialize_node(node: &Node) -> String {
    Serializer::new().serialize_node(node)
}
