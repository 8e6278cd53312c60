use crate::node::data::comment::CommentData;
use crate::node::data::doctype::DocTypeData;
use crate::node::data::element::ElementData;
use crate::node::data::text::TextData;
use tagsoup_shared::node::NodeId;

pub mod arena;
pub mod data;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Different types of nodes that all have their own data structures (NodeData)
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Represents the root document
    Document,
    /// Represents a doctype
    DocType(DocTypeData),
    /// Represents a text
    Text(TextData),
    /// Represents a comment
    Comment(CommentData),
    /// Represents an element
    Element(Box<ElementData>),
}

/// Node structure that resembles a DOM node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// ID of the node, 0 is always the root / document node
    pub id: NodeId,
    /// parent of the node, if any
    pub parent: Option<NodeId>,
    /// any children of the node
    pub children: Vec<NodeId>,
    /// actual data of the node
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            id: NodeId::default(),
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Returns the element data when this node is an element
    pub fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Tag name of an element node, or None for any other node
    pub fn tag_name(&self) -> Option<&str> {
        self.element().map(|e| e.name.as_str())
    }

    /// Returns true when this is an element with the given tag name
    pub fn is_tag(&self, name: &str) -> bool {
        self.tag_name() == Some(name)
    }

    /// Text value of text and comment nodes
    pub fn text_value(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(TextData { value }) | NodeData::Comment(CommentData { value }) => {
                Some(value)
            }
            _ => None,
        }
    }
}
