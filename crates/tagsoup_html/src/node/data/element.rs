use crate::element_factory::ElementKind;
use std::collections::HashMap;
use tagsoup_shared::byte_stream::Location;
use tagsoup_shared::node::NodeId;

/// Script-side object of an element. Holds the event handlers that were registered on it. The
/// parser only registers handlers; it never runs them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Behavior {
    handlers: Vec<(String, String)>,
}

impl Behavior {
    /// Registers (or replaces) the handler source for the given event attribute (ie: "onclick")
    pub fn create_event_handler(&mut self, name: &str, source: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(entry) = self.handlers.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = source.to_string();
            return;
        }
        self.handlers.push((name, source.to_string()));
    }

    /// Returns the handler source registered for the given event attribute
    pub fn event_handler(&self, name: &str) -> Option<&str> {
        self.handlers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, source)| source.as_str())
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Returns true when the attribute name looks like an event handler (onclick, onload, ...)
pub fn is_event_handler_attribute(name: &str) -> bool {
    name.len() > 2 && name.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

#[derive(Debug, Clone, PartialEq)]
/// Data structure for element nodes
pub struct ElementData {
    /// Variant produced by the element factory
    pub kind: ElementKind,
    /// Qualified name of the element (ie: div, svg:rect)
    pub name: String,
    /// Namespace of the element, None for plain HTML elements
    pub namespace: Option<String>,
    /// Element's attributes stored as key-value pairs.
    pub attributes: HashMap<String, String>,
    /// Form fields that logically belong to this form but were placed elsewhere in the tree
    pub lost_children: Vec<NodeId>,
    /// Script-side object, only present when scripting is enabled
    pub behavior: Option<Behavior>,
    /// Location of the start tag
    pub start_location: Location,
    /// Location of the end tag (or document end)
    pub end_location: Option<Location>,
    /// Set once the parser signalled that all children have been added
    pub all_children_added: bool,
}

impl ElementData {
    pub(crate) fn new(
        kind: ElementKind,
        name: &str,
        namespace: Option<&str>,
        attributes: HashMap<String, String>,
        location: Location,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            attributes,
            lost_children: Vec::new(),
            behavior: None,
            start_location: location,
            end_location: None,
            all_children_added: false,
        }
    }

    /// Name without any namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    /// Registers a lost child on this (form) element. Registering the same node twice is a no-op.
    pub fn add_lost_child(&mut self, node_id: NodeId) {
        if !self.lost_children.contains(&node_id) {
            self.lost_children.push(node_id);
        }
    }

    /// Registers every event handler attribute on the behavior object (if any)
    pub(crate) fn register_event_handlers(&mut self) {
        let Some(behavior) = self.behavior.as_mut() else {
            return;
        };

        let mut names: Vec<&String> = self
            .attributes
            .keys()
            .filter(|name| is_event_handler_attribute(name))
            .collect();
        names.sort();
        for name in names {
            behavior.create_event_handler(name, &self.attributes[name]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_handlers_follow_attributes() {
        let mut attributes = HashMap::new();
        attributes.insert("onClick".to_string(), "x()".to_string());
        attributes.insert("id".to_string(), "a".to_string());

        let mut data = ElementData::new(
            ElementKind::Body,
            "body",
            None,
            attributes,
            Location::default(),
        );
        data.register_event_handlers();
        assert!(data.behavior.is_none());

        data.behavior = Some(Behavior::default());
        data.register_event_handlers();
        let behavior = data.behavior.as_ref().unwrap();
        assert_eq!(behavior.event_handler("onclick"), Some("x()"));
        assert_eq!(behavior.handler_count(), 1);
    }

    #[test]
    fn lost_children_are_unique() {
        let mut form = ElementData::new(
            ElementKind::Form,
            "form",
            None,
            HashMap::new(),
            Location::default(),
        );
        form.add_lost_child(NodeId::from(3usize));
        form.add_lost_child(NodeId::from(3usize));
        assert_eq!(form.lost_children, vec![NodeId::from(3usize)]);
    }

    #[test]
    fn local_name_strips_prefix() {
        let data = ElementData::new(
            ElementKind::Unknown,
            "svg:rect",
            Some("http://www.w3.org/2000/svg"),
            HashMap::new(),
            Location::default(),
        );
        assert_eq!(data.local_name(), "rect");
        assert!(is_event_handler_attribute("onload"));
        assert!(!is_event_handler_attribute("on"));
        assert!(!is_event_handler_attribute("id"));
    }
}
