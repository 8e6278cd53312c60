use crate::node::Node;
use std::collections::HashMap;
use tagsoup_shared::node::NodeId;

/// The node arena is the single source for nodes in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeArena {
    /// Current nodes stored as <id, node>
    nodes: HashMap<NodeId, Node>,
    /// Next node ID to use
    next_id: NodeId,
}

impl NodeArena {
    /// Creates a new NodeArena
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: NodeId::default(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Gets the node with the given id
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get the node with the given id as a mutable reference
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    pub fn delete_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.nodes.remove(&node_id)
    }

    /// Registers a node into the arena and returns its new id
    pub fn register_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_id;
        self.next_id = id.next();

        node.id = id;
        self.nodes.insert(id, node);
        id
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}
