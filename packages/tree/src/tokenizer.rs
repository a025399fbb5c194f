use logos::{Lexer, Logos};
use std::fmt;

/// Token types for HTML markup
///
/// Whitespace is significant (it is text), so nothing is skipped.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// Inner text of `<!-- ... -->`
    #[token("<!--", comment)]
    Comment(&'src str),

    /// Inner text of `<!DOCTYPE ...>`
    #[regex(r"<![dD][oO][cC][tT][yY][pP][eE][^>]*>", doctype)]
    Doctype(&'src str),

    /// Full opening tag including `<`, attributes and `>`
    #[regex(r"<[a-zA-Z][a-zA-Z0-9:_.-]*", open_tag)]
    OpenTag(&'src str),

    /// Lower-cased closing tag name
    #[regex(r"</[a-zA-Z][^>]*>", close_tag)]
    CloseTag(String),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that starts nothing recognizable; kept as text
    #[token("<")]
    StrayLt,
}

fn comment<'src>(lex: &mut Lexer<'src, Token<'src>>) -> Option<&'src str> {
    let end = lex.remainder().find("-->")?;
    let inner = &lex.remainder()[..end];
    lex.bump(end + 3);
    Some(inner)
}

fn doctype<'src>(lex: &mut Lexer<'src, Token<'src>>) -> &'src str {
    let slice = lex.slice();
    slice["<!doctype".len()..slice.len() - 1].trim()
}

/// Scan to the `>` that ends the tag, skipping over quoted attribute values.
fn open_tag<'src>(lex: &mut Lexer<'src, Token<'src>>) -> Option<&'src str> {
    let rest = lex.remainder().as_bytes();
    let mut quote: Option<u8> = None;
    let mut last_significant = 0u8;

    for (i, &byte) in rest.iter().enumerate() {
        match quote {
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None => match byte {
                b'"' | b'\'' if last_significant == b'=' => quote = Some(byte),
                b'>' => {
                    lex.bump(i + 1);
                    return Some(lex.slice());
                }
                b if b.is_ascii_whitespace() => {}
                _ => last_significant = byte,
            },
        }
    }

    None
}

fn close_tag<'src>(lex: &mut Lexer<'src, Token<'src>>) -> String {
    let slice = lex.slice();
    slice[2..slice.len() - 1].trim().to_ascii_lowercase()
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Comment(s) => write!(f, "<!--{}-->", s),
            Token::Doctype(s) => write!(f, "<!DOCTYPE {}>", s),
            Token::OpenTag(s) => write!(f, "{}", s),
            Token::CloseTag(s) => write!(f, "</{}>", s),
            Token::Text(s) => write!(f, "{}", s),
            Token::StrayLt => write!(f, "<"),
        }
    }
}

/// Tokenize a complete source string
///
/// Spans that fail to lex (unterminated comments or tags) are dropped; the
/// parser reports them as errors instead.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

/// Opening tag split into name, attributes and the self-closing marker
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

/// Split an opening tag slice (`<name attr="v" ...>`) into its parts.
///
/// Names are lower-cased; values are kept verbatim without their quotes.
/// Attributes without a value get an empty string.
pub fn split_open_tag(slice: &str) -> OpenTag {
    let inner = slice
        .strip_prefix('<')
        .unwrap_or(slice)
        .strip_suffix('>')
        .unwrap_or(slice);
    let bytes = inner.as_bytes();

    let name_end = bytes
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'/')
        .unwrap_or(bytes.len());
    let name = inner[..name_end].to_ascii_lowercase();
    let mut pos = name_end;

    let mut attributes = Vec::new();
    let mut self_closing = false;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if byte == b'/' {
            self_closing = inner[pos + 1..].trim().is_empty();
            pos += 1;
            continue;
        }

        let start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && bytes[pos] != b'='
            && bytes[pos] != b'/'
        {
            pos += 1;
        }
        let attr_name = inner[start..pos].to_ascii_lowercase();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let mut value = String::new();
        if pos < bytes.len() && bytes[pos] == b'=' {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos < bytes.len() && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                let quote = bytes[pos];
                let value_start = pos + 1;
                let value_end = bytes[value_start..]
                    .iter()
                    .position(|b| *b == quote)
                    .map(|offset| value_start + offset)
                    .unwrap_or(bytes.len());
                value = inner[value_start..value_end].to_string();
                pos = (value_end + 1).min(bytes.len());
            } else {
                let value_start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                value = inner[value_start..pos].to_string();
            }
        }

        if !attr_name.is_empty() {
            attributes.push((attr_name, value));
        }
    }

    OpenTag {
        name,
        attributes,
        self_closing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenize_basic_markup() {
        let tokens = kinds(r#"<p id="a">X</p>"#);
        assert_eq!(
            tokens,
            vec![
                Token::OpenTag(r#"<p id="a">"#),
                Token::Text("X"),
                Token::CloseTag("p".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_comment_and_doctype() {
        let tokens = kinds("<!DOCTYPE html><!-- a -> b --><br>");
        assert_eq!(
            tokens,
            vec![
                Token::Doctype("html"),
                Token::Comment(" a -> b "),
                Token::OpenTag("<br>"),
            ]
        );
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let tokens = kinds(r#"<a title="x > y" href='/'>go</a>"#);
        assert_eq!(tokens[0], Token::OpenTag(r#"<a title="x > y" href='/'>"#));
        assert_eq!(tokens[1], Token::Text("go"));
    }

    #[test]
    fn test_stray_lt_is_its_own_token() {
        let tokens = kinds("1 < 2");
        assert_eq!(
            tokens,
            vec![Token::Text("1 "), Token::StrayLt, Token::Text(" 2")]
        );
    }

    #[test]
    fn test_split_open_tag() {
        let tag = split_open_tag(r#"<INPUT Type="text" value='a "b"' disabled data-x=1 />"#);
        assert_eq!(tag.name, "input");
        assert!(tag.self_closing);
        assert_eq!(
            tag.attributes,
            vec![
                ("type".to_string(), "text".to_string()),
                ("value".to_string(), r#"a "b""#.to_string()),
                ("disabled".to_string(), String::new()),
                ("data-x".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_open_tag_unquoted_slash_in_value() {
        let tag = split_open_tag("<a href=/home/>");
        assert_eq!(tag.name, "a");
        assert_eq!(tag.attributes, vec![("href".to_string(), "/home/".to_string())]);
        assert!(!tag.self_closing);
    }
}
