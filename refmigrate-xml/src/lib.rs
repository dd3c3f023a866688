//! Arena-backed XML document model.
//!
//! Responsibilities:
//! - Parse a project or manifest file into an owned tree (`quick-xml` reader).
//! - Support the structural queries and mutations the migration needs:
//!   attribute lookup by local name, subtree traversal, detach, insert.
//! - Serialize back with stable two-space indentation (`quick-xml` writer).
//!
//! Node identities ([`NodeId`]) are arena indices and stay valid across
//! mutation: detaching a node unlinks it from its parent but never reuses
//! its slot. That property is what lets an edit plan be computed against an
//! immutable document and applied afterwards.

mod error;

pub use error::XmlError;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

/// Index of a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element,
    Comment,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Qualified name as written in the source (empty for comments).
    name: String,
    attributes: Vec<(String, String)>,
    /// Concatenated character data directly inside this node. Mixed
    /// content ordering is not preserved; project files do not use it.
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn element(name: String) -> Self {
        Self {
            kind: NodeKind::Element,
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        }
    }

    fn comment(text: String) -> Self {
        Self {
            kind: NodeKind::Comment,
            name: String::new(),
            attributes: Vec::new(),
            text: Some(text),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// A mutable XML tree with stable node identities.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    has_decl: bool,
}

impl Document {
    /// Parse a document from source text.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut has_decl = false;

        loop {
            match reader.read_event()? {
                Event::Eof => break,
                Event::Decl(_) => has_decl = true,
                Event::Start(ref e) => {
                    let id = push_element(&mut nodes, &mut stack, &mut root, e)?;
                    stack.push(id);
                }
                Event::Empty(ref e) => {
                    push_element(&mut nodes, &mut stack, &mut root, e)?;
                }
                Event::End(ref e) => {
                    let Some(_) = stack.pop() else {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        return Err(XmlError::UnexpectedClose(name));
                    };
                }
                Event::Text(ref t) => {
                    let unescaped = t
                        .xml_content()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    if unescaped.trim().is_empty() {
                        continue;
                    }
                    let Some(&top) = stack.last() else {
                        return Err(XmlError::TextOutsideRoot);
                    };
                    let node = &mut nodes[top.0];
                    match &mut node.text {
                        Some(existing) => existing.push_str(&unescaped),
                        None => node.text = Some(unescaped.into_owned()),
                    }
                }
                Event::Comment(ref c) => {
                    let text = c
                        .xml_content()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?
                        .into_owned();
                    if let Some(&top) = stack.last() {
                        let id = NodeId(nodes.len());
                        let mut node = Node::comment(text);
                        node.parent = Some(top);
                        nodes.push(node);
                        nodes[top.0].children.push(id);
                    }
                    // Comments outside the root are dropped.
                }
                Event::CData(ref c) => {
                    let text = String::from_utf8_lossy(c.as_ref()).into_owned();
                    let Some(&top) = stack.last() else {
                        return Err(XmlError::TextOutsideRoot);
                    };
                    let node = &mut nodes[top.0];
                    match &mut node.text {
                        Some(existing) => existing.push_str(&text),
                        None => node.text = Some(text),
                    }
                }
                Event::PI(_) | Event::DocType(_) | Event::GeneralRef(_) => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::UnclosedElement(
                nodes[stack[stack.len() - 1].0].name.clone(),
            ));
        }
        let root = root.ok_or(XmlError::NoRoot)?;

        Ok(Self {
            nodes,
            root,
            has_decl,
        })
    }

    /// Root element of the document.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Qualified name, as written in the source.
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    /// Name with any namespace prefix stripped. Comments have no name.
    pub fn local_name(&self, id: NodeId) -> &str {
        let name = self.name(id);
        name.rsplit(':').next().unwrap_or(name)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes[id.0].kind == NodeKind::Element
    }

    /// Attribute value by local name.
    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.nodes[id.0]
            .attributes
            .iter()
            .find(|(k, _)| k.rsplit(':').next().unwrap_or(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing one with the same local name.
    pub fn set_attribute(&mut self, id: NodeId, local: &str, value: &str) {
        let node = &mut self.nodes[id.0];
        for (k, v) in node.attributes.iter_mut() {
            if k.rsplit(':').next().unwrap_or(k) == local {
                *v = value.to_string();
                return;
            }
        }
        node.attributes.push((local.to_string(), value.to_string()));
    }

    /// Directly contained character data, if any.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = Some(text.to_string());
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    /// True if any text content in the subtree rooted at `id` (including
    /// `id`'s own text) contains `needle`.
    pub fn subtree_text_contains(&self, id: NodeId, needle: &str) -> bool {
        if self.text(id).is_some_and(|t| t.contains(needle)) {
            return true;
        }
        self.descendants(id)
            .into_iter()
            .any(|d| self.text(d).is_some_and(|t| t.contains(needle)))
    }

    /// Create a detached element node.
    pub fn new_element(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::element(name.to_string()));
        id
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert a detached node as a sibling immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, new: NodeId) -> Result<(), XmlError> {
        let parent = self.nodes[anchor.0]
            .parent
            .ok_or(XmlError::DetachedAnchor)?;
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == anchor)
            .ok_or(XmlError::DetachedAnchor)?;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, new);
        Ok(())
    }

    /// Unlink a node from its parent. The arena slot is kept, so other
    /// [`NodeId`]s remain valid; detaching an already-detached node is a
    /// no-op. The root cannot be detached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != id);
    }

    /// Serialize with two-space indentation. The XML declaration is emitted
    /// iff the source had one.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        if self.has_decl {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        }
        self.write_node(&mut writer, self.root)?;
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| XmlError::Malformed(e.to_string()))
    }

    fn write_node(
        &self,
        writer: &mut Writer<Cursor<Vec<u8>>>,
        id: NodeId,
    ) -> Result<(), XmlError> {
        let node = &self.nodes[id.0];

        if node.kind == NodeKind::Comment {
            let text = node.text.as_deref().unwrap_or_default();
            writer.write_event(Event::Comment(BytesText::new(text)))?;
            return Ok(());
        }

        let mut start = BytesStart::new(node.name.as_str());
        for (k, v) in &node.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if node.children.is_empty() && node.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &node.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for &child in &node.children {
            self.write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(node.name.as_str())))?;
        Ok(())
    }
}

fn push_element(
    nodes: &mut Vec<Node>,
    stack: &mut [NodeId],
    root: &mut Option<NodeId>,
    e: &BytesStart<'_>,
) -> Result<NodeId, XmlError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = Node::element(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Malformed(e.to_string()))?
            .into_owned();
        node.attributes.push((key, value));
    }

    let id = NodeId(nodes.len());
    match stack.last() {
        Some(&top) => {
            node.parent = Some(top);
            nodes.push(node);
            nodes[top.0].children.push(id);
        }
        None => {
            if root.is_some() {
                return Err(XmlError::MultipleRoots);
            }
            nodes.push(node);
            *root = Some(id);
        }
    }
    Ok(id)
}
