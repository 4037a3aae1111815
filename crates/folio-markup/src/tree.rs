//! Element tree construction from tokens.
//!
//! Recovers from unbalanced markup the way browsers roughly do: void
//! elements never take children, block starts close an open paragraph, a
//! new list item closes the previous one, and stray end tags are ignored.
//! Nesting is capped at [`MAX_DEPTH`]; deeper start tags are unwrapped so
//! their content lands in the innermost open element.

use crate::lexer::{Attrs, Token};

/// A node of the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose start closes an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "ul",
];

/// Elements that bound the search for an open `<li>` or `<p>` to close.
const SCOPE: &[&str] = &["ul", "ol", "li", "table", "blockquote", "div"];

/// Maximum number of simultaneously open elements.
pub const MAX_DEPTH: usize = 256;

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    open: Vec<Element>,
    /// Start tags unwrapped at the depth cap, awaiting their end tags.
    skipped: Vec<String>,
}

impl TreeBuilder {
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Close the innermost open element.
    fn close_one(&mut self) {
        // Unwrapped elements live inside the innermost open one.
        self.skipped.clear();
        if let Some(element) = self.open.pop() {
            self.append(Node::Element(element));
        }
    }

    /// Close open elements until `depth` remain open.
    fn close_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            self.close_one();
        }
    }

    /// Depth of the innermost open `name` not hidden behind a scope boundary.
    fn find_in_scope(&self, name: &str) -> Option<usize> {
        for (depth, element) in self.open.iter().enumerate().rev() {
            if element.is(name) {
                return Some(depth);
            }
            if SCOPE.contains(&element.name.as_str()) {
                return None;
            }
        }
        None
    }

    fn start(&mut self, name: String, attrs: Attrs, self_closing: bool) {
        if CLOSES_PARAGRAPH.contains(&name.as_str()) {
            if let Some(depth) = self.find_in_scope("p") {
                self.close_to(depth);
            }
        }
        if name == "li" {
            if let Some(depth) = self.find_in_scope("li") {
                self.close_to(depth);
            }
        }

        let element = Element {
            name,
            attrs,
            children: Vec::new(),
        };
        if self_closing || VOID.contains(&element.name.as_str()) {
            self.append(Node::Element(element));
        } else if self.open.len() >= MAX_DEPTH {
            log::debug!("unwrapping <{}> past depth {MAX_DEPTH}", element.name);
            self.skipped.push(element.name);
        } else {
            self.open.push(element);
        }
    }

    fn end(&mut self, name: &str) {
        if self.skipped.last().is_some_and(|skipped| skipped == name) {
            self.skipped.pop();
            return;
        }
        match self.open.iter().rposition(|e| e.is(name)) {
            Some(depth) => self.close_to(depth),
            None => log::debug!("ignoring stray </{name}>"),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.close_to(0);
        self.roots
    }
}

/// Build the element tree for a token stream.
pub fn build(tokens: Vec<Token<'_>>) -> Vec<Node> {
    let mut builder = TreeBuilder::default();
    for token in tokens {
        match token {
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => builder.start(name, attrs, self_closing),
            Token::EndTag { name } => builder.end(&name),
            Token::Text(text) => builder.append(Node::Text(text.into_owned())),
        }
    }
    builder.finish()
}
