use crate::error::{ParseError, ParseResult};
use crate::node::{Attributes, Document, Node};
use crate::tokenizer::{split_open_tag, Token};
use logos::{Lexer, Logos};

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is taken verbatim up to the matching close tag
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Tolerant HTML tree builder
///
/// Mirrors how a soup-style parser recovers from sloppy markup: unmatched
/// closing tags are dropped, a closing tag closes everything opened after its
/// match, and anything still open at the end of input is closed implicitly.
pub struct Parser<'src> {
    lexer: Lexer<'src, Token<'src>>,
    /// Elements opened but not yet closed, innermost last
    open: Vec<Node>,
    roots: Vec<Node>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Token::lexer(source),
            open: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Parse a complete document
    pub fn parse_document(mut self) -> ParseResult<Document> {
        while let Some(result) = self.lexer.next() {
            let token = result.map_err(|_| self.lex_error())?;
            match token {
                Token::Doctype(content) => self.append(Node::Doctype {
                    content: content.to_string(),
                }),
                Token::Comment(content) => self.append(Node::comment(content)),
                Token::Text(content) => self.append_text(content),
                Token::StrayLt => self.append_text("<"),
                Token::OpenTag(slice) => self.open_element(slice),
                Token::CloseTag(name) => self.close_element(&name),
            }
        }

        while let Some(element) = self.open.pop() {
            self.append(element);
        }

        Ok(Document::from_nodes(self.roots))
    }

    fn lex_error(&self) -> ParseError {
        let span = self.lexer.span();
        let slice = self.lexer.slice();
        if slice.starts_with("<!--") {
            ParseError::unterminated_comment(span.start)
        } else if slice.starts_with('<') {
            ParseError::unterminated_tag(span.start)
        } else {
            ParseError::lexer_error(span.start)
        }
    }

    fn open_element(&mut self, slice: &str) {
        let tag = split_open_tag(slice);
        let attributes: Attributes = tag.attributes.into_iter().collect();
        let element = Node::Element {
            tag: tag.name.clone(),
            attributes,
            children: Vec::new(),
        };

        if is_void_element(&tag.name) || tag.self_closing {
            self.append(element);
            return;
        }

        self.open.push(element);

        if is_raw_text_element(&tag.name) {
            self.consume_raw_text(&tag.name);
        }
    }

    /// Take everything up to `</tag` as a single text node.
    fn consume_raw_text(&mut self, tag: &str) {
        let rest = self.lexer.remainder();
        let needle = format!("</{}", tag);
        // ASCII lowercasing keeps byte offsets aligned with `rest`
        let end = rest
            .to_ascii_lowercase()
            .find(&needle)
            .unwrap_or(rest.len());
        if end > 0 {
            let text = &rest[..end];
            self.lexer.bump(end);
            self.append_text(text);
        }
    }

    fn close_element(&mut self, name: &str) {
        let Some(index) = self
            .open
            .iter()
            .rposition(|node| node.tag() == Some(name))
        else {
            // No open element to close
            return;
        };

        while self.open.len() > index {
            if let Some(element) = self.open.pop() {
                self.append(element);
            }
        }
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut().and_then(Node::children_mut) {
            Some(children) => children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Append text, merging with a directly preceding text node.
    fn append_text(&mut self, content: &str) {
        let siblings = match self.open.last_mut().and_then(Node::children_mut) {
            Some(children) => children,
            None => &mut self.roots,
        };
        if let Some(Node::Text { content: previous }) = siblings.last_mut() {
            previous.push_str(content);
        } else {
            siblings.push(Node::text(content));
        }
    }
}

/// Parse HTML source into a document tree
pub fn parse(source: &str) -> ParseResult<Document> {
    Parser::new(source).parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse(r#"<html><body><p id="a">X</p></body></html>"#).unwrap();
        assert_eq!(doc.nodes.len(), 1);

        let body = doc.body().expect("body");
        let p = &body.children().unwrap()[0];
        assert_eq!(p.tag(), Some("p"));
        assert_eq!(p.attributes().unwrap().get("id"), Some("a"));
        assert_eq!(p.text_content(), "X");
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let doc = parse("<div>a<br>b<span/>c</div>").unwrap();
        let div = &doc.nodes[0];
        let children = div.children().unwrap();
        assert_eq!(children.len(), 5);
        assert_eq!(children[1].tag(), Some("br"));
        assert_eq!(children[3].tag(), Some("span"));
        assert_eq!(div.text_content(), "abc");
    }

    #[test]
    fn test_unmatched_close_tag_is_dropped() {
        let doc = parse("<div>a</span>b</div>").unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0].children().unwrap(), &[Node::text("ab")]);
    }

    #[test]
    fn test_close_tag_closes_inner_elements() {
        let doc = parse("<ul><li>one<li>two</ul><p>after</p>").unwrap();
        assert_eq!(doc.nodes.len(), 2);
        let ul = &doc.nodes[0];
        assert_eq!(ul.children().unwrap().len(), 1);
        assert_eq!(ul.text_content(), "onetwo");
        assert_eq!(doc.nodes[1].tag(), Some("p"));
    }

    #[test]
    fn test_unclosed_elements_at_eof() {
        let doc = parse("<div><p>open").unwrap();
        assert_eq!(doc.nodes[0].text_content(), "open");
        assert_eq!(doc.nodes[0].children().unwrap()[0].tag(), Some("p"));
    }

    #[test]
    fn test_raw_text_elements_keep_markup() {
        let doc = parse("<script>if (a < b && c > d) { x('</div>'); }</script><p>x</p>").unwrap();
        let script = &doc.nodes[0];
        assert_eq!(
            script.children().unwrap(),
            &[Node::text("if (a < b && c > d) { x('</div>'); }")]
        );
        assert_eq!(doc.nodes[1].tag(), Some("p"));
    }

    #[test]
    fn test_stray_lt_merges_into_text() {
        let doc = parse("<p>1 < 2</p>").unwrap();
        assert_eq!(doc.nodes[0].children().unwrap(), &[Node::text("1 < 2")]);
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        let doc = parse("<DIV CLASS='x'>a</Div>").unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0].tag(), Some("div"));
        assert_eq!(doc.nodes[0].attributes().unwrap().get("class"), Some("x"));
    }

    #[test]
    fn test_unterminated_comment_is_an_error() {
        let err = parse("<p>a</p><!-- never closed").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedComment { pos: 8 });
    }

    #[test]
    fn test_unterminated_tag_is_an_error() {
        let err = parse(r#"<p>a</p><div class="x"#).unwrap_err();
        assert_eq!(err, ParseError::UnterminatedTag { pos: 8 });
    }
}
