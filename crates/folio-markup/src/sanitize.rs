//! Element and attribute allow-list.
//!
//! Unknown elements are unwrapped so their content survives. Elements whose
//! content is never document text are dropped whole. Allowed elements keep
//! only their allowed attributes.

use crate::lexer::Attrs;
use crate::tree::{Element, Node};

/// Dropped together with their content.
const OPAQUE: &[&str] = &["script", "style", "noscript", "template", "head", "title", "textarea"];

/// Block elements unwrapped inside list items, whose content is inline.
const UNWRAP_IN_LI: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p"];

const IMG_ATTRS: &[&str] = &[
    "src",
    "alt",
    "data-fit",
    "data-rotate",
    "data-zoom",
    "data-pan-x",
    "data-pan-y",
    "data-width",
    "data-height",
    "data-hash",
];

const VIDEO_ATTRS: &[&str] = &[
    "src",
    "alt",
    "poster",
    "data-fit",
    "data-width",
    "data-height",
    "data-duration",
    "data-hash",
];

/// Allowed attributes of an allowed element, or `None` for unknown elements.
fn allowed_attrs(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" | "ul" | "li" | "strong" | "em" | "br" => {
            Some(&[])
        }
        "a" => Some(&["href"]),
        "img" => Some(IMG_ATTRS),
        "video" => Some(VIDEO_ATTRS),
        _ => None,
    }
}

fn is_media(name: &str) -> bool {
    matches!(name, "img" | "video")
}

fn filter_attrs(name: &str, attrs: Attrs, allowed: &[&str]) -> Attrs {
    let pending = is_media(name)
        && attrs
            .get("class")
            .is_some_and(|class| class.split_ascii_whitespace().any(|c| c == "pending"));

    let mut kept: Attrs = attrs
        .into_iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .collect();
    if pending {
        kept.insert("class".to_string(), "pending".to_string());
    }
    kept
}

/// Apply the allow-list to a forest of nodes.
pub fn sanitize(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    sanitize_into(nodes, false, &mut out);
    out
}

fn sanitize_into(nodes: Vec<Node>, in_li: bool, out: &mut Vec<Node>) {
    for node in nodes {
        let element = match node {
            Node::Text(text) => {
                out.push(Node::Text(text));
                continue;
            }
            Node::Element(element) => element,
        };

        let name = match element.name.as_str() {
            "b" => "strong".to_string(),
            "i" => "em".to_string(),
            _ => element.name,
        };

        if OPAQUE.contains(&name.as_str()) {
            log::debug!("dropping <{name}> and its content");
            continue;
        }

        let Some(allowed) = allowed_attrs(&name) else {
            log::debug!("unwrapping <{name}>");
            sanitize_into(element.children, in_li, out);
            continue;
        };

        if in_li && UNWRAP_IN_LI.contains(&name.as_str()) {
            sanitize_into(element.children, in_li, out);
            continue;
        }

        let mut children = Vec::with_capacity(element.children.len());
        sanitize_into(element.children, in_li || name == "li", &mut children);
        out.push(Node::Element(Element {
            attrs: filter_attrs(&name, element.attrs, allowed),
            name,
            children,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::tree::build;

    fn clean(input: &str) -> Vec<Node> {
        sanitize(build(tokenize(input)))
    }

    fn names(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| match n {
                Node::Element(e) => e.name.clone(),
                Node::Text(t) => format!("{t:?}"),
            })
            .collect()
    }

    fn first(nodes: &[Node]) -> &Element {
        match &nodes[0] {
            Node::Element(e) => e,
            Node::Text(t) => panic!("expected element, got text {t:?}"),
        }
    }

    #[test]
    fn test_bold_italic_renamed() {
        let nodes = clean("<b>x</b><i>y</i>");
        assert_eq!(names(&nodes), vec!["strong", "em"]);
    }

    #[test]
    fn test_unknown_unwrapped() {
        let nodes = clean("<div><span class=\"x\">hello</span> <font>world</font></div>");
        assert_eq!(names(&nodes), vec!["\"hello\"", "\" \"", "\"world\""]);
    }

    #[test]
    fn test_opaque_dropped() {
        let nodes = clean("<script>alert(1)</script><style>p{}</style><noscript><p>x</p></noscript>ok");
        assert_eq!(names(&nodes), vec!["\"ok\""]);
    }

    #[test]
    fn test_attributes_filtered() {
        let nodes = clean(
            r#"<a href="/x" onclick="evil()" style="color:red">x</a>"#,
        );
        let a = first(&nodes);
        assert_eq!(a.attrs.len(), 1);
        assert_eq!(a.attr("href"), Some("/x"));

        let nodes = clean(r#"<p class="lead" id="p1">x</p>"#);
        assert!(first(&nodes).attrs.is_empty());
    }

    #[test]
    fn test_media_attributes() {
        let nodes = clean(
            r#"<img src="assets/a1b2c3d4e5f6.jpg" class="photo pending" data-zoom="120" data-foo="1" width="10" onerror="x">"#,
        );
        let img = first(&nodes);
        let keys: Vec<_> = img.attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["src", "data-zoom", "class"]);
        assert_eq!(img.attr("class"), Some("pending"));

        let nodes = clean(r#"<video src="v.mp4" poster="p.jpg" controls autoplay data-duration="3.5"></video>"#);
        let keys: Vec<_> = first(&nodes).attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["src", "poster", "data-duration"]);
    }

    #[test]
    fn test_blocks_unwrapped_in_li() {
        let nodes = clean("<ul><li><p>one</p><h2>two</h2></li></ul>");
        let ul = first(&nodes);
        let li = first(&ul.children);
        assert_eq!(names(&li.children), vec!["\"one\"", "\"two\""]);
    }
}
