/// Tests to verify the serializer writes back what the parser read
use crate::*;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Jane Doe &mdash; Resume</title>
    <style>p > b { color: red; }</style>
  </head>
  <body>
    <!-- contact block -->
    <section id="contact" class="card">
      <p id="a">X</p>
      <p>Line<br>break &amp; more</p>
      <img src="me.png" alt="">
    </section>
  </body>
</html>
"#;

#[test]
fn test_roundtrip_preserves_source_text() {
    let doc = parse(PAGE).expect("Failed to parse");
    let serialized = serialize(&doc);
    assert_eq!(serialized, PAGE);
}

#[test]
fn test_roundtrip_is_structurally_stable() {
    let sources = vec![
        "<div><p>a<br/>b</p></div>",
        "<ul><li>one<li>two</ul>",
        "<p title='say \"hi\"'>x</p>",
        "<input disabled>",
        "<div>unclosed",
    ];

    for source in sources {
        let doc = parse(source).expect(&format!("Failed to parse: {}", source));
        let serialized = serialize(&doc);
        let reparsed = parse(&serialized).expect(&format!("Failed to reparse: {}", serialized));
        assert_eq!(doc, reparsed, "structure changed for {}", source);
    }
}

#[test]
fn test_serialize_normalizes_markup() {
    let doc = parse("<DIV Class=x><span/><input disabled></DIV>").unwrap();
    assert_eq!(
        serialize(&doc),
        r#"<div class="x"><span></span><input disabled=""></div>"#
    );
}

#[test]
fn test_serialize_node_subtree() {
    let node = Node::element("p")
        .with_attr("id", "a")
        .with_child(Node::text("Y"));
    assert_eq!(serialize_node(&node), r#"<p id="a">Y</p>"#);
}

#[test]
fn test_attribute_with_both_quote_kinds_is_escaped() {
    let node = Node::element("p").with_attr("title", r#"it's "x""#);
    assert_eq!(
        serialize_node(&node),
        r#"<p title="it's &quot;x&quot;"></p>"#
    );
}

#[test]
fn test_node_serializes_to_tagged_json() {
    let node = Node::element("p").with_child(Node::text("Y"));
    let json = serde_json::to_string(&node).expect("Failed to serialize");
    assert!(json.contains(r#""type":"Element""#));
    assert!(json.contains(r#""type":"Text""#));
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, node);
}
