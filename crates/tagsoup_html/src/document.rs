use crate::node::arena::NodeArena;
use crate::node::data::comment::CommentData;
use crate::node::data::doctype::DocTypeData;
use crate::node::data::element::ElementData;
use crate::node::data::text::TextData;
use crate::node::{Node, NodeData};
use core::fmt;
use std::fmt::{Display, Formatter};
use tagsoup_shared::node::NodeId;

/// A document is a tree of nodes stored in an arena. The root node (id 0) is always the
/// document node. Nodes that are created but not yet attached have no parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    arena: NodeArena,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        arena.register_node(Node::new(NodeData::Document));
        Self { arena }
    }

    pub fn root(&self) -> NodeId {
        NodeId::root()
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.arena.node(node_id)
    }

    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.arena.node_mut(node_id)
    }

    pub fn element(&self, node_id: NodeId) -> Option<&ElementData> {
        self.node(node_id).and_then(Node::element)
    }

    pub fn element_mut(&mut self, node_id: NodeId) -> Option<&mut ElementData> {
        self.node_mut(node_id).and_then(Node::element_mut)
    }

    /// Tag name of the given node, None when it is not an element
    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.node(node_id).and_then(Node::tag_name)
    }

    pub fn is_tag(&self, node_id: NodeId, name: &str) -> bool {
        self.tag_name(node_id) == Some(name)
    }

    /// Registers a new, unattached element
    pub fn create_element(&mut self, data: ElementData) -> NodeId {
        self.arena
            .register_node(Node::new(NodeData::Element(Box::new(data))))
    }

    /// Registers a new, unattached text node
    pub fn create_text(&mut self, value: &str) -> NodeId {
        self.arena
            .register_node(Node::new(NodeData::Text(TextData::with_value(value))))
    }

    /// Registers a new, unattached comment node
    pub fn create_comment(&mut self, value: &str) -> NodeId {
        self.arena
            .register_node(Node::new(NodeData::Comment(CommentData::with_value(value))))
    }

    /// Registers a new, unattached doctype node
    pub fn create_doctype(&mut self, doctype: DocTypeData) -> NodeId {
        self.arena.register_node(Node::new(NodeData::DocType(doctype)))
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id).and_then(|node| node.parent)
    }

    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        match self.node(node_id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub fn first_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.children(node_id).first().copied()
    }

    pub fn last_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.children(node_id).last().copied()
    }

    /// Detaches the node from its current parent (if any). The node stays in the arena.
    pub fn detach(&mut self, node_id: NodeId) {
        let Some(parent_id) = self.parent(node_id) else {
            return;
        };

        if let Some(parent) = self.arena.node_mut(parent_id) {
            parent.children.retain(|child| *child != node_id);
        }
        if let Some(node) = self.arena.node_mut(node_id) {
            node.parent = None;
        }
    }

    /// Appends the node as the last child of the parent. A node that is already attached
    /// somewhere else is moved.
    pub fn append_child(&mut self, parent_id: NodeId, node_id: NodeId) {
        if parent_id == node_id || self.arena.node(parent_id).is_none() {
            return;
        }

        self.detach(node_id);
        if let Some(parent) = self.arena.node_mut(parent_id) {
            parent.children.push(node_id);
        }
        if let Some(node) = self.arena.node_mut(node_id) {
            node.parent = Some(parent_id);
        }
    }

    /// Inserts the node as the sibling directly before the reference node. Nothing happens when
    /// the reference node is not attached.
    pub fn insert_before(&mut self, reference_id: NodeId, node_id: NodeId) {
        if reference_id == node_id {
            return;
        }
        let Some(parent_id) = self.parent(reference_id) else {
            return;
        };

        self.detach(node_id);
        if let Some(parent) = self.arena.node_mut(parent_id) {
            let position = parent
                .children
                .iter()
                .position(|child| *child == reference_id)
                .unwrap_or(parent.children.len());
            parent.children.insert(position, node_id);
        }
        if let Some(node) = self.arena.node_mut(node_id) {
            node.parent = Some(parent_id);
        }
    }

    /// Removes the node (and its subtree) from the tree and from the arena
    pub fn remove(&mut self, node_id: NodeId) {
        if node_id.is_root() {
            return;
        }

        self.detach(node_id);
        let mut pending = vec![node_id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.arena.delete_node(id) {
                pending.extend(node.children);
            }
        }
    }

    /// Moves all children of `from` to the end of `to`, keeping their order
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = self.children(from).to_vec();
        for child in children {
            self.append_child(to, child);
        }
    }

    /// Returns the ancestors of the node, starting with the root and ending with the node itself
    pub fn ancestors(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(node_id);
        while let Some(id) = current {
            if self.node(id).is_none() {
                break;
            }
            chain.push(id);
            current = self.parent(id);
        }
        chain.reverse();
        chain
    }

    /// Nearest ancestor (not including the node itself) with the given tag name
    pub fn enclosing(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = self.parent(node_id);
        while let Some(id) = current {
            if self.is_tag(id, tag) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Returns true when `ancestor_id` is a (strict) ancestor of `node_id`
    pub fn is_ancestor_of(&self, ancestor_id: NodeId, node_id: NodeId) -> bool {
        let mut current = self.parent(node_id);
        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The `<html>` element: the first element child of the document node
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|id| self.node(*id).is_some_and(Node::is_element))
    }

    /// The `<body>` element directly below the document element, if any
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|id| self.is_tag(*id, "body"))
    }

    /// All nodes in document order, starting at (and including) the given node
    pub fn descendants(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut pending = vec![node_id];
        while let Some(id) = pending.pop() {
            result.push(id);
            pending.extend(self.children(id).iter().rev());
        }
        result
    }

    /// All elements with the given tag name, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.is_tag(*id, tag))
            .collect()
    }

    /// Concatenated text of all text nodes below the given node
    pub fn text_content(&self, node_id: NodeId) -> String {
        self.descendants(node_id)
            .into_iter()
            .filter_map(|id| match self.node(id).map(|n| &n.data) {
                Some(NodeData::Text(text)) => Some(text.value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Fields that are submitted with the given form: its submittable descendants plus any
    /// lost children that ended up elsewhere in the tree.
    pub fn form_elements(&self, form_id: NodeId) -> Vec<NodeId> {
        let mut fields: Vec<NodeId> = self
            .descendants(form_id)
            .into_iter()
            .skip(1)
            .filter(|id| self.element(*id).is_some_and(|e| e.kind.is_submittable()))
            .collect();

        if let Some(form) = self.element(form_id) {
            for lost in &form.lost_children {
                if !fields.contains(lost) && self.node(*lost).is_some() {
                    fields.push(*lost);
                }
            }
        }
        fields
    }

    fn print_tree(&self, node_id: NodeId, prefix: String, last: bool, f: &mut Formatter) {
        let Some(node) = self.node(node_id) else {
            return;
        };

        let mut buffer = prefix.clone();
        if last {
            buffer.push_str("└─ ");
        } else {
            buffer.push_str("├─ ");
        }

        match &node.data {
            NodeData::Document => {
                _ = writeln!(f, "{buffer}Document");
            }
            NodeData::DocType(DocTypeData {
                name,
                public_id,
                system_id,
            }) => {
                _ = writeln!(f, r#"{buffer}<!DOCTYPE {name} "{public_id}" "{system_id}">"#);
            }
            NodeData::Text(TextData { value }) => {
                _ = writeln!(f, r#"{buffer}"{value}""#);
            }
            NodeData::Comment(CommentData { value }) => {
                _ = writeln!(f, "{buffer}<!-- {value} -->");
            }
            NodeData::Element(element) => {
                _ = write!(f, "{}<{}", buffer, element.name);
                let mut attributes: Vec<_> = element.attributes.iter().collect();
                attributes.sort();
                for (key, value) in attributes {
                    _ = write!(f, " {key}={value}");
                }
                _ = writeln!(f, ">");
            }
        }

        let child_prefix = if last {
            format!("{prefix}   ")
        } else {
            format!("{prefix}│  ")
        };

        let children = &node.children;
        for (i, child) in children.iter().enumerate() {
            self.print_tree(*child, child_prefix.clone(), i == children.len() - 1, f);
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.print_tree(self.root(), String::new(), true, f);
        Ok(())
    }
}
