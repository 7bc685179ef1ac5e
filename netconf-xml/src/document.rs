//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The owning arena for an XML tree (`spec.md` §3, "XML node").
//!
//! Parents exclusively own their children; parent back-references are
//! plain `NodeId` indices into the same arena, never `Rc`/`Weak`
//! (`spec.md` §9, "Cyclic structures" / `never reference-count the tree`).

use std::cell::RefCell;

use netconf_yang::StatementId;

/// Index into a [`Document`]'s arena. Stable for the document's lifetime;
/// invalidated only when the whole document is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub enum Node {
    Element {
        name: String,
        prefix: Option<String>,
        /// Attribute children precede element/body children, matching
        /// `spec.md` §3 invariant (ii), `CX_ATTR` iteration order.
        children: Vec<NodeId>,
        /// Set when this element is the synthetic `top` wrapper the parser
        /// introduces for a multi-rooted fragment (`spec.md` §4.A).
        synthetic_top: bool,
    },
    Attribute {
        name: String,
        prefix: Option<String>,
        value: String,
    },
    Body {
        text: String,
    },
}

impl Node {
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. })
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, Node::Attribute { .. })
    }

    pub fn is_body(&self) -> bool {
        matches!(self, Node::Body { .. })
    }

    pub fn local_name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } | Node::Attribute { name, .. } => Some(name),
            Node::Body { .. } => None,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        match self {
            Node::Element { prefix, .. } | Node::Attribute { prefix, .. } => prefix.as_deref(),
            Node::Body { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Element { children, .. } => children,
            _ => &[],
        }
    }
}

struct Slot {
    node: Node,
    parent: Option<NodeId>,
    /// Non-owning handle to the YANG schema node this element/leaf is bound
    /// to (`spec.md` §3, "Schema link"). Valid only while the `YangSpec`
    /// that produced it is alive.
    binding: RefCell<Option<StatementId>>,
}

/// The owning arena for one parsed XML fragment or document.
#[derive(Default)]
pub struct Document {
    slots: Vec<Slot>,
    root: Option<NodeId>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.slots.len())
            .field("root", &self.root)
            .finish()
    }
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    fn alloc(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot {
            node,
            parent,
            binding: RefCell::new(None),
        });
        id
    }

    pub fn new_element(
        &mut self,
        name: impl Into<String>,
        prefix: Option<String>,
        parent: Option<NodeId>,
    ) -> NodeId {
        self.alloc(
            Node::Element {
                name: name.into(),
                prefix,
                children: Vec::new(),
                synthetic_top: false,
            },
            parent,
        )
    }

    pub fn new_synthetic_top(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(
            Node::Element {
                name: name.into(),
                prefix: None,
                children: Vec::new(),
                synthetic_top: true,
            },
            None,
        )
    }

    pub fn new_attribute(
        &mut self,
        name: impl Into<String>,
        prefix: Option<String>,
        value: impl Into<String>,
        parent: NodeId,
    ) -> NodeId {
        self.alloc(
            Node::Attribute {
                name: name.into(),
                prefix,
                value: value.into(),
            },
            Some(parent),
        )
    }

    pub fn new_body(&mut self, text: impl Into<String>, parent: NodeId) -> NodeId {
        self.alloc(Node::Body { text: text.into() }, Some(parent))
    }

    /// Appends `child` to `parent`'s child list. Callers must append
    /// attribute children before any element/body child to preserve
    /// invariant (ii).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Node::Element { children, .. } = &mut self.slots[parent.index()].node {
            children.push(child);
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.slots[id.index()].node
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.index()].parent
    }

    /// Used only when a synthetic `top` wrapper is introduced after its
    /// children were already allocated with `parent: None`.
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.slots[id.index()].parent = Some(parent);
    }

    pub fn binding(&self, id: NodeId) -> Option<StatementId> {
        *self.slots[id.index()].binding.borrow()
    }

    pub fn set_binding(&self, id: NodeId, binding: Option<StatementId>) {
        *self.slots[id.index()].binding.borrow_mut() = binding;
    }

    /// Attribute children of an element, in document order.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children()
            .iter()
            .copied()
            .filter(move |c| self.node(*c).is_attribute())
    }

    /// Element/body children of an element, in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children()
            .iter()
            .copied()
            .filter(move |c| !self.node(*c).is_attribute())
    }

    /// Concatenated body text of an element's direct `Body` children
    /// (`spec.md` §4.C, "let b = concatenated body text of x").
    pub fn body_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.node(id).children() {
            if let Node::Body { text } = self.node(*child) {
                out.push_str(text);
            }
        }
        out
    }

    /// First element child with the given local name, if any.
    pub fn find_element_child(&self, id: NodeId, local_name: &str) -> Option<NodeId> {
        self.element_children(id)
            .find(|c| self.node(*c).local_name() == Some(local_name))
    }

    /// Replaces a parent's child list wholesale, preserving which ids are
    /// attributes vs element/body (used by `netconf-validate`'s sort,
    /// which reorders without allocating new nodes).
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if let Node::Element {
            children: slot_children,
            ..
        } = &mut self.slots[parent.index()].node
        {
            *slot_children = children;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_precede_elements_in_iteration() {
        let mut doc = Document::new();
        let root = doc.new_element("a", None, None);
        doc.set_root(root);
        let attr = doc.new_attribute("id", None, "1", root);
        doc.append_child(root, attr);
        let child = doc.new_element("b", None, Some(root));
        doc.append_child(root, child);

        let attrs: Vec<_> = doc.attributes(root).collect();
        let elems: Vec<_> = doc.element_children(root).collect();
        assert_eq!(attrs, vec![attr]);
        assert_eq!(elems, vec![child]);
    }

    #[test]
    fn body_text_concatenates_direct_children() {
        let mut doc = Document::new();
        let root = doc.new_element("leaf", None, None);
        doc.set_root(root);
        let b1 = doc.new_body("hel", root);
        doc.append_child(root, b1);
        let b2 = doc.new_body("lo", root);
        doc.append_child(root, b2);
        assert_eq!(doc.body_text(root), "hello");
    }
}
