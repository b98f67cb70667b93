//! Arena-backed XML tree built from quick-xml SAX events.
//!
//! Tracks the byte offset and line of every element plus the start of its
//! character data, so callers can later locate values in the raw text.

use crate::error::{Result, XmlError};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;
use std::collections::HashMap;

/// Source position of a node: byte offset into the raw document and
/// zero-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
}

/// Index of a node inside its [`Document`] arena. Stable for the lifetime
/// of the document; usable for identity comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct NodeData {
    name: String,
    attributes: HashMap<String, String>,
    children: Vec<NodeId>,
    text: String,
    pos: Pos,
    text_pos: Option<Pos>,
}

pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

struct LineOffsetTable {
    line_starts: Vec<usize>,
}

impl LineOffsetTable {
    fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    fn pos(&self, content: &str, offset: usize) -> Pos {
        let offset = offset.min(content.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        Pos {
            offset,
            line: line as u32,
        }
    }
}

impl Document {
    /// Parses raw XML into a navigable tree.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] on malformed markup, a missing root element,
    /// unclosed elements, or trailing content after the root.
    pub fn parse(content: &str) -> Result<Self> {
        let line_table = LineOffsetTable::new(content);
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        loop {
            let event_start = reader.buffer_position();
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                offset: reader.error_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(XmlError::TrailingContent {
                            offset: event_start,
                        });
                    }

                    let id = NodeId(nodes.len());
                    nodes.push(NodeData {
                        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                        attributes: decode_attributes(e),
                        children: Vec::new(),
                        text: String::new(),
                        pos: line_table.pos(content, event_start as usize),
                        text_pos: None,
                    });

                    match stack.last() {
                        Some(&parent) => nodes[parent.0].children.push(id),
                        None => root = Some(id),
                    }
                    if matches!(event, Event::Start(_)) {
                        stack.push(id);
                    }
                }
                Event::Text(ref e) => {
                    let text = match reader.decoder().decode(e.as_ref()) {
                        Ok(cow) => {
                            let s = cow.trim().to_string();
                            quick_xml::escape::unescape(&s)
                                .map(|c| c.into_owned())
                                .unwrap_or(s)
                        }
                        Err(_) => String::from_utf8_lossy(e.as_ref()).trim().to_string(),
                    };
                    if let Some(&id) = stack.last() {
                        append_text(&mut nodes[id.0], &text, || {
                            line_table.pos(content, event_start as usize)
                        });
                    }
                }
                Event::CData(ref e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                    if let Some(&id) = stack.last() {
                        append_text(&mut nodes[id.0], &text, || {
                            line_table.pos(content, event_start as usize)
                        });
                    }
                }
                Event::End(_) => {
                    // Mismatched end tags already fail inside read_event
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&unclosed) = stack.last() {
            return Err(XmlError::UnclosedElement {
                name: nodes[unclosed.0].name.clone(),
            });
        }

        root.map_or(Err(XmlError::NoRoot), |root| Ok(Self { nodes, root }))
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            doc: self,
            id: self.root,
        }
    }
}

fn decode_attributes(e: &quick_xml::events::BytesStart<'_>) -> HashMap<String, String> {
    e.attributes()
        .filter_map(std::result::Result::ok)
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect()
}

fn append_text(node: &mut NodeData, text: &str, pos: impl FnOnce() -> Pos) {
    if text.is_empty() {
        return;
    }
    if node.text.is_empty() {
        node.text_pos = Some(pos());
        node.text.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Lightweight handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Local element name (namespace prefix stripped).
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    /// Attribute value by its raw attribute name, e.g. `xmlns`.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data().attributes.get(name).map(String::as_str)
    }

    /// Trimmed, entity-unescaped character data of this element.
    pub fn text(&self) -> &'a str {
        &self.data().text
    }

    /// Position of the element's opening tag.
    pub fn pos(&self) -> Pos {
        self.data().pos
    }

    /// Position where the element's character data starts. Falls back to
    /// the opening tag when the element has no text.
    pub fn text_pos(&self) -> Pos {
        self.data().text_pos.unwrap_or(self.data().pos)
    }

    pub fn children(self) -> impl Iterator<Item = Node<'a>> + 'a {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { doc, id })
    }

    /// First direct child with the given element name.
    pub fn child(self, name: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.name() == name)
    }

    /// Non-empty trimmed text of the named direct child.
    pub fn child_text(self, name: &str) -> Option<&'a str> {
        self.child(name)
            .map(|c| c.text())
            .filter(|t| !t.is_empty())
    }

    /// Descends a dotted element path (e.g. `parent.relativePath`) and
    /// returns the final element's non-empty text.
    pub fn value_at_path(self, path: &str) -> Option<&'a str> {
        let mut node = self;
        for segment in path.split('.') {
            node = node.child(segment)?;
        }
        Some(node.text()).filter(|t| !t.is_empty())
    }

    /// Document-order iterator over this node and every descendant.
    pub fn descendants(self) -> Descendants<'a> {
        Descendants {
            doc: self.doc,
            stack: vec![self.id],
        }
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = Node { doc: self.doc, id };
        self.stack
            .extend(self.doc.nodes[id.0].children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_tree() {
        let doc = Document::parse("<a><b>one</b><c attr=\"x\">two</c></a>").unwrap();
        let root = doc.root();
        assert_eq!(root.name(), "a");
        assert_eq!(root.child_text("b"), Some("one"));
        assert_eq!(root.child("c").unwrap().attribute("attr"), Some("x"));
        assert_eq!(root.children().count(), 2);
    }

    #[test]
    fn test_malformed_markup() {
        assert!(matches!(
            Document::parse("<a><b></a>"),
            Err(XmlError::Malformed { .. })
        ));
        assert!(matches!(
            Document::parse("<a attr=\"unclosed></a>"),
            Err(XmlError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(Document::parse(""), Err(XmlError::NoRoot)));
        assert!(matches!(
            Document::parse("<?xml version=\"1.0\"?>"),
            Err(XmlError::NoRoot)
        ));
    }

    #[test]
    fn test_unclosed_root() {
        assert!(matches!(
            Document::parse("<a><b>text</b>"),
            Err(XmlError::UnclosedElement { .. })
        ));
    }

    #[test]
    fn test_trailing_content() {
        assert!(matches!(
            Document::parse("<a/><b/>"),
            Err(XmlError::TrailingContent { .. })
        ));
    }

    #[test]
    fn test_self_closing_child() {
        let doc = Document::parse("<a><b/><c>v</c></a>").unwrap();
        let root = doc.root();
        assert_eq!(root.children().count(), 2);
        assert_eq!(root.child("b").unwrap().text(), "");
        assert!(root.child_text("b").is_none());
    }

    #[test]
    fn test_entity_unescape() {
        let doc = Document::parse("<a><b>x &amp; y</b></a>").unwrap();
        assert_eq!(doc.root().child_text("b"), Some("x & y"));
    }

    #[test]
    fn test_cdata_text() {
        let doc = Document::parse("<a><b><![CDATA[ raw < text ]]></b></a>").unwrap();
        assert_eq!(doc.root().child_text("b"), Some("raw < text"));
    }

    #[test]
    fn test_value_at_path() {
        let doc = Document::parse("<a><b><c>deep</c></b></a>").unwrap();
        assert_eq!(doc.root().value_at_path("b.c"), Some("deep"));
        assert!(doc.root().value_at_path("b.missing").is_none());
        assert!(doc.root().value_at_path("b").is_none()); // element-only text
    }

    #[test]
    fn test_descendants_document_order() {
        let doc = Document::parse("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<_> = doc.root().descendants().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_root_identity() {
        let doc = Document::parse("<a><b/></a>").unwrap();
        let root = doc.root();
        let from_walk = root.descendants().next().unwrap();
        assert_eq!(root.id(), from_walk.id());
        assert_ne!(root.id(), root.child("b").unwrap().id());
    }

    #[test]
    fn test_position_tracking() {
        let xml = "<a>\n  <b>value</b>\n</a>";
        let doc = Document::parse(xml).unwrap();
        let b = doc.root().child("b").unwrap();
        assert_eq!(b.pos().line, 1);
        assert_eq!(&xml[b.pos().offset..b.pos().offset + 3], "<b>");
        // text_pos points at the character data itself
        assert_eq!(&xml[b.text_pos().offset..b.text_pos().offset + 5], "value");
    }

    #[test]
    fn test_text_pos_fallback() {
        let doc = Document::parse("<a><b/></a>").unwrap();
        let b = doc.root().child("b").unwrap();
        assert_eq!(b.text_pos(), b.pos());
    }

    #[test]
    fn test_namespaced_root() {
        let xml = r#"<project xmlns="http://maven.apache.org/POM/4.0.0"><x>1</x></project>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(doc.root().name(), "project");
        assert_eq!(
            doc.root().attribute("xmlns"),
            Some("http://maven.apache.org/POM/4.0.0")
        );
    }
}
