//! Arena-based element tree.
//!
//! Nodes are stored in a flat `Vec` arena and linked by index. Markup
//! nesting is input-controlled, so every walk here uses an explicit stack
//! rather than recursion.

use std::io::Write;

use crate::error::Result;

/// Deepest level [`Document::outline`] indents to.
pub const OUTLINE_MAX_INDENT: usize = 32;

/// Index into the [`Document`]'s node arena.
pub type NodeId = usize;

// ------------------------------------------------------------------
// Node types
// ------------------------------------------------------------------

/// A parsed document.
#[derive(Debug, Clone)]
pub struct Document {
    pub nodes: Vec<Node>,
    /// The synthetic `Document` node; the root element is its child.
    pub root: NodeId,
    /// Trimmed payload of the `<!DOCTYPE ...>` declaration, if any.
    pub doctype: Option<String>,
    /// The body wrapper, set once the tree builder has opened or
    /// synthesized it.
    pub body_element: Option<NodeId>,
}

/// A single node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// Tag name and attributes of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

// ------------------------------------------------------------------
// ElementData
// ------------------------------------------------------------------

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Set an attribute. A name already present keeps its position and
    /// takes the new value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check if this element has a given class.
    ///
    /// The `class` attribute value is split on ASCII whitespace and each
    /// token is compared to `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .map(|v| v.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }
}

// ------------------------------------------------------------------
// Document
// ------------------------------------------------------------------

impl Document {
    /// Create an empty document with a synthetic `Document` root node.
    pub fn new() -> Self {
        let root_node = Node {
            kind: NodeKind::Document,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root_node],
            root: 0,
            doctype: None,
            body_element: None,
        }
    }

    /// Add a new node to the arena and return its [`NodeId`].
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child_id` as the last child of `parent_id`.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        self.nodes[parent_id].children.push(child_id);
        self.nodes[child_id].parent = Some(parent_id);
    }

    /// Append text to `parent`, merging into its last child when that is
    /// already a text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.nodes[parent].children.last()
            && let NodeKind::Text(existing) = &mut self.nodes[last].kind
        {
            existing.push_str(text);
            return;
        }
        let id = self.add_node(NodeKind::Text(text.to_string()));
        self.append_child(parent, id);
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Get the [`ElementData`] for a node, if it is an `Element`.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Tag name of an element node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Element children only, skipping text, comments and PIs.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
    }

    /// Pre-order walk of `id` and its descendants.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Concatenated text of a node and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeKind::Text(s) = &self.nodes[node].kind {
                out.push_str(s);
            }
        }
        out
    }

    /// The first element under the document node.
    pub fn root_element(&self) -> Option<NodeId> {
        self.child_elements(self.root).next()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body_element
    }

    pub fn head(&self) -> Option<NodeId> {
        self.find_first_element(self.root, "head")
    }

    /// Find the `<title>` text content, if any.
    pub fn title(&self) -> Option<String> {
        let title_id = self.find_first_element(self.root, "title")?;
        let text = self.text_content(title_id);
        if text.is_empty() { None } else { Some(text) }
    }

    /// Find the first element whose `id` attribute matches `target`.
    pub fn get_element_by_id(&self, target: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|&n| self.element(n).and_then(|e| e.id()) == Some(target))
    }

    /// Depth-first search for the first element named `name` at or below
    /// `from`.
    pub fn find_first_element(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(from).find(|&n| self.name(n) == Some(name))
    }

    /// Every element named `name`, in document order.
    pub fn elements_by_tag_name(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|&n| self.name(n) == Some(name))
            .collect()
    }

    /// Indented one-node-per-line dump, for debugging and tests.
    ///
    /// Indentation stops growing at [`OUTLINE_MAX_INDENT`] levels; deeper
    /// lines carry their level as a `[n]` prefix instead.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            if !matches!(node.kind, NodeKind::Document) {
                let level = depth - 1;
                out.push_str(&"  ".repeat(level.min(OUTLINE_MAX_INDENT)));
                if level > OUTLINE_MAX_INDENT {
                    out.push_str(&format!("[{level}] "));
                }
                match &node.kind {
                    NodeKind::Element(e) => {
                        out.push('<');
                        out.push_str(&e.name);
                        for a in &e.attributes {
                            out.push_str(&format!(" {}={:?}", a.name, a.value));
                        }
                        out.push('>');
                    },
                    NodeKind::Text(t) => out.push_str(&format!("{t:?}")),
                    NodeKind::Comment(c) => out.push_str(&format!("<!--{c}-->")),
                    NodeKind::ProcessingInstruction(p) => out.push_str(&format!("<?{p}?>")),
                    NodeKind::Document => {},
                }
                out.push('\n');
            }
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Write the tree as compact JSON.
    ///
    /// The document is an object with `doctype` and `children`. Elements
    /// are `{"element", "attributes", "children"}`; other nodes are
    /// single-key objects (`text`, `comment`, `pi`). Output is streamed
    /// with an explicit stack, so arbitrarily deep trees are fine.
    pub fn write_json<W: Write>(&self, mut out: W) -> Result<()> {
        out.write_all(b"{\"doctype\":")?;
        match &self.doctype {
            Some(doctype) => serde_json::to_writer(&mut out, doctype)?,
            None => out.write_all(b"null")?,
        }
        out.write_all(b",\"children\":[")?;

        let mut stack = Vec::new();
        push_json_children(&mut stack, &self.nodes[self.root].children);
        while let Some(step) = stack.pop() {
            let (id, comma) = match step {
                JsonStep::Close => {
                    out.write_all(b"]}")?;
                    continue;
                },
                JsonStep::Open { id, comma } => (id, comma),
            };
            if comma {
                out.write_all(b",")?;
            }
            match &self.nodes[id].kind {
                NodeKind::Element(e) => {
                    out.write_all(b"{\"element\":")?;
                    serde_json::to_writer(&mut out, &e.name)?;
                    out.write_all(b",\"attributes\":{")?;
                    for (i, a) in e.attributes.iter().enumerate() {
                        if i > 0 {
                            out.write_all(b",")?;
                        }
                        serde_json::to_writer(&mut out, &a.name)?;
                        out.write_all(b":")?;
                        serde_json::to_writer(&mut out, &a.value)?;
                    }
                    out.write_all(b"},\"children\":[")?;
                    stack.push(JsonStep::Close);
                    push_json_children(&mut stack, &self.nodes[id].children);
                },
                NodeKind::Text(t) => write_json_leaf(&mut out, "text", t)?,
                NodeKind::Comment(c) => write_json_leaf(&mut out, "comment", c)?,
                NodeKind::ProcessingInstruction(p) => write_json_leaf(&mut out, "pi", p)?,
                NodeKind::Document => out.write_all(b"null")?,
            }
        }
        out.write_all(b"]}")?;
        Ok(())
    }

    /// [`Document::write_json`] into a string.
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_json(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

enum JsonStep {
    Open { id: NodeId, comma: bool },
    Close,
}

fn push_json_children(stack: &mut Vec<JsonStep>, children: &[NodeId]) {
    stack.extend(
        children
            .iter()
            .enumerate()
            .rev()
            .map(|(i, &id)| JsonStep::Open { id, comma: i > 0 }),
    );
}

fn write_json_leaf<W: Write>(out: &mut W, key: &str, value: &str) -> Result<()> {
    out.write_all(b"{\"")?;
    out.write_all(key.as_bytes())?;
    out.write_all(b"\":")?;
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"}")?;
    Ok(())
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
