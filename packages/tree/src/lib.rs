pub mod error;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;

pub use error::{ParseError, ParseResult};
pub use node::{Attributes, Document, Node, NodePath};
pub use parser::{parse, Parser};
pub use serializer::{serialize, serialize_node, Serializer};
pub use tokenizer::{tokenize, Token};
