use crate::document::Document;
use tagsoup_shared::byte_stream::Location;
use tagsoup_shared::node::NodeId;

/// What a parse context is parsing into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextKind {
    /// A complete document, rooted at the document node
    Document,
    /// A fragment that is inserted under an existing element
    Fragment,
    /// Markup written by a script while another parse is running
    InlineSnippet,
}

/// State of a single parse operation. Nested parses get their own context, so the open
/// elements and pending text of the outer parse are never touched by an inner one.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub kind: ContextKind,
    /// Open elements, outermost first
    open_elements: Vec<NodeId>,
    /// Number of entries at the bottom of the stack that were open before the parse started.
    /// They are never popped.
    base: usize,
    /// Text that is received but not yet added to the tree
    pending_text: String,
    pending_location: Option<Location>,
    /// Tag names the tag balancer should consider open before the first token
    pub context_stack: Vec<String>,
}

impl ParseContext {
    /// Context for a full document parse. The stack is rooted at the document node.
    pub fn document(root: NodeId) -> Self {
        Self::with_elements(ContextKind::Document, vec![root], Vec::new())
    }

    /// Context for a fragment that is parsed into `target`. The ancestors of the target are
    /// open, and the balancer behaves as if the elements in `context_stack` are open.
    pub fn fragment(document: &Document, target: NodeId, context_stack: Vec<String>) -> Self {
        Self::with_elements(
            ContextKind::Fragment,
            document.ancestors(target),
            context_stack,
        )
    }

    /// Context for markup written at the insertion point of `outer`. The open elements are
    /// copied so the written markup lands where the outer parse currently is.
    pub fn inline_snippet(outer: &ParseContext, document: &Document) -> Self {
        let context_stack = outer
            .open_elements
            .iter()
            .filter_map(|id| document.tag_name(*id))
            .map(str::to_string)
            .collect();

        Self::with_elements(
            ContextKind::InlineSnippet,
            outer.open_elements.clone(),
            context_stack,
        )
    }

    fn with_elements(kind: ContextKind, open_elements: Vec<NodeId>, context_stack: Vec<String>) -> Self {
        Self {
            kind,
            base: open_elements.len(),
            open_elements,
            pending_text: String::new(),
            pending_location: None,
            context_stack,
        }
    }

    /// The node that receives the next child
    pub fn current(&self) -> NodeId {
        match self.open_elements.last() {
            Some(id) => *id,
            None => NodeId::root(),
        }
    }

    pub fn push(&mut self, node_id: NodeId) {
        self.open_elements.push(node_id);
    }

    /// Pops the current node. Nodes that were open before the parse started are never popped.
    pub fn pop(&mut self) -> Option<NodeId> {
        if self.open_elements.len() <= self.base {
            return None;
        }
        self.open_elements.pop()
    }

    /// Open elements, outermost first
    pub fn open_elements(&self) -> &[NodeId] {
        &self.open_elements
    }

    /// Returns the innermost open element with one of the given tag names
    pub fn find(&self, document: &Document, names: &[&str]) -> Option<NodeId> {
        self.open_elements
            .iter()
            .rev()
            .find(|id| {
                document
                    .tag_name(**id)
                    .is_some_and(|name| names.contains(&name))
            })
            .copied()
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.open_elements.contains(&node_id)
    }

    pub fn has_pending_text(&self) -> bool {
        !self.pending_text.is_empty()
    }

    pub fn append_text(&mut self, text: &str, location: Location) {
        if self.pending_location.is_none() {
            self.pending_location = Some(location);
        }
        self.pending_text.push_str(text);
    }

    /// Takes the pending text out of the context
    pub fn take_text(&mut self) -> Option<(String, Location)> {
        if self.pending_text.is_empty() {
            return None;
        }
        let location = self.pending_location.take().unwrap_or_default();
        Some((std::mem::take(&mut self.pending_text), location))
    }
}

/// Builds the tag names the balancer needs to parse a fragment as if it were located under
/// `context`. The result always starts with `html` followed by `body`.
pub fn fragment_context_stack(document: &Document, context: NodeId) -> Vec<String> {
    let mut names: Vec<String> = document
        .ancestors(context)
        .into_iter()
        .filter_map(|id| document.tag_name(id))
        .map(str::to_ascii_lowercase)
        .collect();

    if names.first().map(String::as_str) != Some("html") {
        names.insert(0, "html".to_string());
    }
    if names.get(1).map(String::as_str) != Some("body") {
        names.insert(1, "body".to_string());
    }
    names
}
