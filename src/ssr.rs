//! Server-side rendering of node trees to HTML.
//!
//! Every element (and fragment) carries a hydration marker whose value is its
//! dotted child path from the mount container, so the root is `0` and its
//! second child `0.1`. Text nodes carry no marker. Two adjacent non-empty text
//! siblings are separated by an empty comment so the parser sees two nodes,
//! and an empty text node is written as `<!--t-->`.

use std::fmt::Write as _;

use crate::diff::NodePath;
use crate::dom::html::{is_void, EMPTY_TEXT_COMMENT, FRAGMENT_TAG};
use crate::vdom::{Node, NodeKind, Property};

/// Render `node` as the root of a document, with hydration markers.
pub fn render_to_string(node: &Node, marker_attribute: &str) -> String {
    let mut out = String::new();
    write_node(&mut out, node, &NodePath::root().child(0), Some(marker_attribute));
    out
}

/// Render `node` without hydration markers.
pub fn render_plain(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, &NodePath::root().child(0), None);
    out
}

fn write_node(out: &mut String, node: &Node, path: &NodePath, marker: Option<&str>) {
    let tag = match node.kind() {
        NodeKind::Text { content } if content.is_empty() => {
            out.push_str(EMPTY_TEXT_COMMENT);
            return;
        }
        NodeKind::Text { content } => {
            escape_into(out, content, false);
            return;
        }
        NodeKind::Element { tag } => tag.as_str(),
        NodeKind::Fragment => FRAGMENT_TAG,
    };

    out.push('<');
    out.push_str(tag);
    if let Some(marker) = marker {
        let _ = write!(out, " {marker}=\"{path}\"");
    }
    write_attributes(out, node);
    out.push('>');

    if is_void(tag) {
        return;
    }

    let mut previous_was_text = false;
    for (index, child) in node.children().iter().enumerate() {
        let is_text = child.text_content().is_some_and(|c| !c.is_empty());
        if previous_was_text && is_text {
            out.push_str("<!---->");
        }
        previous_was_text = is_text;
        write_node(out, child, &path.child(index), marker);
    }

    let _ = write!(out, "</{tag}>");
}

fn write_attributes(out: &mut String, node: &Node) {
    let mut styles: Vec<String> = Vec::new();

    for property in node.properties().iter() {
        match property {
            Property::Attribute { name, value } if name == "style" => {
                styles.push(value.trim().trim_end_matches(';').to_owned());
            }
            Property::Attribute { name, value } => {
                let _ = write!(out, " {name}=\"");
                escape_into(out, value, true);
                out.push('"');
            }
            Property::BooleanAttribute { name, value: true } => {
                out.push(' ');
                out.push_str(name);
            }
            Property::Style { name, value } => styles.push(format!("{name}: {value}")),
            Property::BooleanAttribute { value: false, .. } | Property::EventHandler { .. } => {}
        }
    }

    if !styles.is_empty() {
        out.push_str(" style=\"");
        escape_into(out, &styles.join("; "), true);
        out.push('"');
    }
}

/// Escape text content, or an attribute value when `attribute` is set.
fn escape_into(out: &mut String, value: &str, attribute: bool) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\'' if attribute => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::html;
    use crate::event::HandlerId;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    const MARKER: &str = "data-raven-id";

    #[test]
    fn markers_follow_child_paths() {
        let tree = Node::element("main")
            .with_child(Node::element("h1").with_child(Node::text("Title")))
            .with_child(
                Node::element("ul")
                    .with_child(Node::element("li").with_child(Node::text("one")))
                    .with_child(Node::element("li").with_child(Node::text("two"))),
            );
        assert_snapshot!(
            render_to_string(&tree, MARKER),
            @r#"<main data-raven-id="0"><h1 data-raven-id="0.0">Title</h1><ul data-raven-id="0.1"><li data-raven-id="0.1.0">one</li><li data-raven-id="0.1.1">two</li></ul></main>"#
        );
    }

    #[test]
    fn attributes_styles_and_handlers() {
        let tree = Node::element("button")
            .attribute("type", "submit")
            .style("color", "red")
            .boolean_attribute("disabled", true)
            .boolean_attribute("hidden", false)
            .style("margin", "0")
            .on("click", HandlerId::from_raw(1))
            .with_child(Node::text("Save"));
        assert_snapshot!(
            render_plain(&tree),
            @r#"<button type="submit" disabled style="color: red; margin: 0">Save</button>"#
        );
    }

    #[test]
    fn adjacent_text_and_empty_text() {
        let tree = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::text("b"))
            .with_child(Node::text(""))
            .with_child(Node::text("c"));
        assert_snapshot!(render_plain(&tree), @"<p>a<!---->b<!--t-->c</p>");
    }

    #[test]
    fn fragments_and_void_elements() {
        let tree = Node::fragment()
            .with_child(Node::element("img").attribute("src", "x.png"))
            .with_child(Node::element("br"));
        assert_snapshot!(
            render_to_string(&tree, MARKER),
            @r#"<raven-fragment data-raven-id="0"><img data-raven-id="0.0" src="x.png"><br data-raven-id="0.1"></raven-fragment>"#
        );
    }

    #[test]
    fn escaping() {
        let tree = Node::element("a")
            .attribute("title", r#"say "hi" & 'bye'"#)
            .with_child(Node::text("1 < 2 > 0 & \"q\""));
        assert_snapshot!(
            render_plain(&tree),
            @r#"<a title="say &quot;hi&quot; &amp; &#39;bye&#39;">1 &lt; 2 &gt; 0 &amp; "q"</a>"#
        );
    }

    #[test]
    fn markup_parses_back_to_the_same_structure() {
        let tree = Node::element("form")
            .attribute("action", "/send?a=1&b=2")
            .style("display", "flex")
            .with_child(Node::element("input").boolean_attribute("required", true))
            .with_child(Node::text("x"))
            .with_child(Node::text(""))
            .with_child(Node::text("y & z"))
            .with_child(Node::fragment().with_child(Node::element("span")));
        let dom = html::parse(&render_to_string(&tree, MARKER), MARKER).unwrap();
        assert_eq!(dom.snapshot(), vec![tree]);
        assert!(dom.find_by_marker("0.4.0").is_some());
    }
}
