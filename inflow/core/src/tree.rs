//! Document Tree
//!
//! An ordered tree of typed nodes standing in for a live document. Nodes are
//! arena-allocated and addressed by [`NodeId`]; ids are never reused within a
//! document, so a detached subtree stays addressable until it is dropped on
//! the floor.
//!
//! The tree is the single shared mutable resource of the client engine. The
//! boundary patcher is the only component that mutates marker regions; the
//! queue processor only appends staging containers to the body.
//!
//! Lookups by element id and by boundary id walk the attached tree in
//! document order, so detached or excised nodes are naturally invisible to
//! them, exactly like `getElementById` against a live page.

use std::fmt;

use crate::marker::{BoundaryId, BoundaryState, MarkerKind};

/// Handle to a node in a [`Document`] arena.
///
/// Plain index, cheap to copy. Only meaningful for the document that issued
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// The kind of a document node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A container element with a tag name and a handful of attributes.
    Element {
        /// Tag name (`div`, `h2`, `button`, ...).
        tag: String,
        /// The `id` attribute, if any. Staging containers are found by it.
        id: Option<String>,
        /// The `class` attribute, if any.
        class: Option<String>,
        /// Extra attributes as name/value pairs, in insertion order.
        attrs: Vec<(String, String)>,
        /// Whether the element carries the `hidden` attribute.
        hidden: bool,
    },
    /// A run of text.
    Text(String),
    /// A boundary sentinel. Non-visible; delimits a placeholder region and
    /// encodes its state.
    Marker {
        /// Opening (with state) or closing.
        kind: MarkerKind,
        /// The boundary this sentinel belongs to. Present on opening
        /// sentinels; closing sentinels are anonymous.
        boundary: Option<BoundaryId>,
        /// Diagnostic token attached when the boundary errored.
        digest: Option<String>,
    },
}

/// A single node: its kind plus tree links.
#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An ordered document tree.
///
/// Created with a `body` element at the root. All mutation goes through the
/// methods here; there is no way to hold a reference into the arena across a
/// mutation.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// Boundary ids whose regions were successfully replaced, waiting for
    /// whoever registered interest. The abstract form of a retry hook on the
    /// opening sentinel.
    notifications: Vec<BoundaryId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `body` root element.
    #[must_use]
    pub fn new() -> Self {
        let root_node = Node {
            kind: NodeKind::Element {
                tag: "body".to_string(),
                id: None,
                class: None,
                attrs: Vec::new(),
                hidden: false,
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root_node],
            root: NodeId(0),
            notifications: Vec::new(),
        }
    }

    /// The root `body` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_string(),
            id: None,
            class: None,
            attrs: Vec::new(),
            hidden: false,
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    /// Create a detached marker node.
    pub fn create_marker(&mut self, kind: MarkerKind, boundary: Option<BoundaryId>) -> NodeId {
        self.alloc(NodeKind::Marker {
            kind,
            boundary,
            digest: None,
        })
    }

    /// The kind of a node.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    /// Set the `id` attribute of an element node. No-op on other kinds.
    pub fn set_id(&mut self, node: NodeId, value: &str) {
        if let NodeKind::Element { id, .. } = &mut self.nodes[node.0].kind {
            *id = Some(value.to_string());
        }
    }

    /// Set the `class` attribute of an element node. No-op on other kinds.
    pub fn set_class(&mut self, node: NodeId, value: &str) {
        if let NodeKind::Element { class, .. } = &mut self.nodes[node.0].kind {
            *class = Some(value.to_string());
        }
    }

    /// Add an attribute to an element node. No-op on other kinds.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[node.0].kind {
            attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// Toggle the `hidden` attribute of an element node. No-op on other kinds.
    pub fn set_hidden(&mut self, node: NodeId, value: bool) {
        if let NodeKind::Element { hidden, .. } = &mut self.nodes[node.0].kind {
            *hidden = value;
        }
    }

    /// Replace the content of a text node. No-op on other kinds.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(content) = &mut self.nodes[node.0].kind {
            *content = text.to_string();
        }
    }

    /// Rewrite the state carried by an opening sentinel. No-op on closing
    /// sentinels and non-marker nodes.
    pub fn set_marker_state(&mut self, node: NodeId, state: BoundaryState) {
        if let NodeKind::Marker { kind, .. } = &mut self.nodes[node.0].kind {
            if matches!(kind, MarkerKind::Open(_)) {
                *kind = MarkerKind::Open(state);
            }
        }
    }

    /// Attach a diagnostic token to a sentinel. No-op on non-marker nodes.
    pub fn set_marker_digest(&mut self, node: NodeId, digest: &str) {
        if let NodeKind::Marker { digest: slot, .. } = &mut self.nodes[node.0].kind {
            *slot = Some(digest.to_string());
        }
    }

    /// The parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// The children of a node, in document order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// The sibling immediately after `node`, if any.
    #[must_use]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings.get(pos + 1).copied()
    }

    /// Append `child` as the last child of `parent`. The child must be
    /// detached; a child that already has a parent is detached first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` immediately before `reference` under the same parent.
    /// No-op if `reference` is detached.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        let Some(parent) = self.nodes[reference.0].parent else {
            return;
        };
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let pos = siblings
            .iter()
            .position(|&n| n == reference)
            .unwrap_or(siblings.len());
        siblings.insert(pos, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detach a node from its parent. The subtree below it stays intact and
    /// addressable through its [`NodeId`]. No-op on already-detached nodes.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent else {
            return;
        };
        self.nodes[parent.0].children.retain(|&n| n != node);
        self.nodes[node.0].parent = None;
    }

    /// Whether a node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Walk the attached tree in document order.
    fn walk(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            for &child in self.nodes[node.0].children.iter().rev() {
                stack.push(child);
            }
            Some(node)
        })
    }

    /// Find the first attached element with the given `id` attribute.
    #[must_use]
    pub fn element_by_id(&self, target: &str) -> Option<NodeId> {
        self.walk().find(|&node| {
            matches!(
                &self.nodes[node.0].kind,
                NodeKind::Element { id: Some(id), .. } if id == target
            )
        })
    }

    /// Find the attached opening sentinel for a boundary.
    #[must_use]
    pub fn open_marker_for(&self, target: &BoundaryId) -> Option<NodeId> {
        self.walk().find(|&node| {
            matches!(
                &self.nodes[node.0].kind,
                NodeKind::Marker {
                    kind: MarkerKind::Open(_),
                    boundary: Some(boundary),
                    ..
                } if boundary == target
            )
        })
    }

    /// Concatenated text of a subtree, in document order.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let NodeKind::Text(text) = &self.nodes[current.0].kind {
                out.push_str(text);
            }
            for &child in self.nodes[current.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Record that a boundary's region was replaced. Called by the patcher
    /// after a successful splice.
    pub(crate) fn notify_resolved(&mut self, boundary: BoundaryId) {
        self.notifications.push(boundary);
    }

    /// Drain the pending resolve notifications, oldest first.
    ///
    /// Nobody listening is fine; the list just keeps accumulating until it
    /// is drained.
    pub fn take_notifications(&mut self) -> Vec<BoundaryId> {
        std::mem::take(&mut self.notifications)
    }

    /// Serialize a subtree back to markup. Markers render as comments
    /// carrying their code and, for opening sentinels, the boundary id.
    ///
    /// Diagnostic form, used by tests and the tutorial page; not the wire
    /// format the server emits.
    #[must_use]
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Element {
                tag,
                id,
                class,
                attrs,
                hidden,
            } => {
                out.push('<');
                out.push_str(tag);
                if let Some(id) = id {
                    out.push_str(&format!(" id=\"{id}\""));
                }
                if let Some(class) = class {
                    out.push_str(&format!(" class=\"{class}\""));
                }
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                if *hidden {
                    out.push_str(" hidden");
                }
                out.push('>');
                for &child in &self.nodes[node.0].children {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Marker {
                kind,
                boundary,
                digest,
            } => {
                out.push_str("<!--");
                out.push_str(kind.code());
                if let Some(boundary) = boundary {
                    out.push_str(&format!(" {boundary}"));
                }
                if let Some(digest) = digest {
                    out.push_str(&format!(" dgst={digest}"));
                }
                out.push_str("-->");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_append_and_traverse() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let hello = doc.create_text("hello");
        let world = doc.create_text(" world");
        doc.append_child(doc.body(), div);
        doc.append_child(div, hello);
        doc.append_child(div, world);

        assert_eq!(doc.children(div), &[hello, world]);
        assert_eq!(doc.next_sibling(hello), Some(world));
        assert_eq!(doc.next_sibling(world), None);
        assert_eq!(doc.text_content(doc.body()), "hello world");
    }

    #[test]
    fn test_element_by_id_ignores_detached() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_id(div, "target");
        doc.append_child(doc.body(), div);
        assert_eq!(doc.element_by_id("target"), Some(div));

        doc.detach(div);
        assert_eq!(doc.element_by_id("target"), None);
        // The subtree itself is still intact.
        assert!(!doc.is_attached(div));
    }

    #[test]
    fn test_insert_before() {
        let mut doc = Document::new();
        let a = doc.create_text("a");
        let c = doc.create_text("c");
        doc.append_child(doc.body(), a);
        doc.append_child(doc.body(), c);

        let b = doc.create_text("b");
        doc.insert_before(c, b);
        assert_eq!(doc.text_content(doc.body()), "abc");
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let mut doc = Document::new();
        let container = doc.create_element("div");
        let inner = doc.create_text("inner");
        doc.append_child(container, inner);
        doc.append_child(doc.body(), container);

        doc.detach(container);
        assert_eq!(doc.children(container), &[inner]);
        assert_eq!(doc.text_content(container), "inner");
        assert_eq!(doc.text_content(doc.body()), "");
    }

    #[test]
    fn test_to_html_round_trip_shape() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_id(div, "x");
        doc.set_class(div, "content");
        let text = doc.create_text("hi");
        doc.append_child(div, text);
        doc.append_child(doc.body(), div);

        assert_eq!(
            doc.to_html(doc.body()),
            "<body><div id=\"x\" class=\"content\">hi</div></body>"
        );
    }
}
