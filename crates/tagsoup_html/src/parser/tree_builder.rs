use crate::document::Document;
use crate::element_factory::get_element_factory;
use crate::node::data::doctype::DocTypeData;
use crate::node::data::element::{is_event_handler_attribute, Behavior};
use crate::node::HTML_NAMESPACE;
use crate::page::PageHandle;
use crate::parser::balancer::TagBalancer;
use crate::parser::content_handler::ContentHandler;
use crate::parser::context::{ContextKind, ParseContext};
use crate::parser::error_logger::{ErrorLogger, ParserError};
use crate::parser::quirks::identify_quirks_mode;
use crate::parser::{drive, is_blank};
use crate::script::{is_javascript, ScriptContext, ScriptHost, LEGACY_ARRAY_METHODS};
use crate::tokenizer::{Scanner, ScannerOptions};
use log::{debug, trace};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tagsoup_config::{BrowserFeature, BrowserVersion};
use tagsoup_shared::byte_stream::{CharStream, Location};
use tagsoup_shared::node::NodeId;

/// Whether a `<head>` has been seen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadState {
    NotYetParsed,
    /// The head was present in the markup
    Parsed,
    /// The head was inferred, either by the balancer or because the body came first
    SyntheticallyInserted,
}

/// Builds the document tree from the balanced event stream. The balancer makes sure every
/// start has an end; the builder decides where the nodes actually end up, which is not always
/// below the current node (content misplaced in tables, fields of a form that was closed too
/// early, stray titles).
pub struct TreeBuilder {
    page: PageHandle,
    browser: BrowserVersion,
    scanner_options: ScannerOptions,
    javascript_enabled: bool,
    xhtml: bool,

    head_state: HeadState,
    /// Set between a redundant `<head>` and its end
    parsing_inner_head: bool,
    head: Option<NodeId>,
    body: Option<NodeId>,
    /// Form that was closed by error recovery but still collects the fields that follow it
    orphan_form: Option<NodeId>,

    /// Context of the parse that is currently running
    context: ParseContext,
    /// Contexts of the parses interrupted by script writes, innermost last
    suspended: Vec<ParseContext>,
    /// Names of started elements that were not added to the tree. Their end is skipped as well.
    skipped: Vec<String>,

    script_host: Option<Box<dyn ScriptHost>>,
    /// Scripts completed while parsing written markup. They run once the write is done.
    postponed_scripts: Vec<NodeId>,

    error_logger: Rc<RefCell<ErrorLogger>>,
    whitespace_tags: &'static HashSet<String>,
}

impl TreeBuilder {
    pub fn new(page: PageHandle, context: ParseContext, error_logger: Rc<RefCell<ErrorLogger>>) -> Self {
        let (browser, scanner_options, javascript_enabled, xhtml) = {
            let page = page.get();
            (
                page.browser.clone(),
                ScannerOptions::for_page(&page, context.kind == ContextKind::Fragment),
                page.options.javascript_enabled,
                page.is_xhtml(),
            )
        };

        Self {
            page,
            browser,
            scanner_options,
            javascript_enabled,
            xhtml,
            head_state: HeadState::NotYetParsed,
            parsing_inner_head: false,
            head: None,
            body: None,
            orphan_form: None,
            context,
            suspended: Vec::new(),
            skipped: Vec::new(),
            script_host: None,
            postponed_scripts: Vec::new(),
            error_logger,
            whitespace_tags: tagsoup_config::inline_whitespace_tags(),
        }
    }

    #[must_use]
    pub fn with_script_host(mut self, host: Option<Box<dyn ScriptHost>>) -> Self {
        self.script_host = host;
        self
    }

    /// Hands the script host back once parsing is done
    pub fn into_script_host(self) -> Option<Box<dyn ScriptHost>> {
        self.script_host
    }

    pub fn head_state(&self) -> HeadState {
        self.head_state
    }

    /// The body element created by this parse, if any
    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn has_feature(&self, feature: BrowserFeature) -> bool {
        self.browser.has_feature(feature)
    }

    fn warn(&self, location: Location, kind: ParserError, message: &str) {
        self.error_logger
            .borrow_mut()
            .add_error(location, kind, message);
    }

    /// Adds the pending text to the tree
    fn flush_text(&mut self) {
        let Some((text, location)) = self.context.take_text() else {
            return;
        };

        let current = self.context.current();
        let handle = self.page.clone();
        let mut page = handle.get_mut();
        let document = &mut page.document;

        // <html> only holds the head and the body
        if document.is_tag(current, "html") {
            trace!("dropping text below <html>");
            return;
        }

        if document.is_tag(current, "tr") && !is_blank(&text) {
            // </td>text</tr>: the text goes before the table
            if let Some(table) = document.enclosing(current, "table") {
                debug!("moving text out of table row");
                let node = document.create_text(&text);
                document.insert_before(table, node);
                self.warn(location, ParserError::MisplacedText, "text in table row moved before the table");
            }
            return;
        }

        let node = document.create_text(&text);
        document.append_child(current, node);
    }

    /// Decides whether whitespace-only text that starts a new text run can be dropped
    fn remove_empty_characters(&self, document: &Document) -> bool {
        let current = self.context.current();
        match document.last_child(current) {
            Some(last) => {
                let Some(element) = document.element(last) else {
                    return true;
                };
                if element.local_name().eq_ignore_ascii_case("input") {
                    return false;
                }
                let has_children = document.first_child(last).is_some();
                !(has_children && self.whitespace_tags.contains(&element.local_name().to_ascii_lowercase()))
            }
            None => !document.is_tag(current, "font"),
        }
    }

    /// Innermost element on the stack with one of the names, falling back to the current node
    fn find_on_stack(&self, document: &Document, names: &[&str]) -> NodeId {
        match self.context.find(document, names) {
            Some(node) => node,
            None => self.context.current(),
        }
    }

    /// Open form that contains the innermost open table
    fn form_around_table(&self, document: &Document) -> Option<NodeId> {
        let mut seen_table = false;
        for node in self.context.open_elements().iter().rev() {
            match document.tag_name(*node) {
                Some("table") => seen_table = true,
                Some("form") if seen_table => return Some(*node),
                _ => {}
            }
        }
        None
    }

    /// Inserts the node before `reference`, or appends it to `parent` when the reference is not
    /// in the tree
    fn insert_before_or_append(document: &mut Document, reference: NodeId, node: NodeId, parent: NodeId) {
        if document.parent(reference).is_some() {
            document.insert_before(reference, node);
        } else {
            document.append_child(parent, node);
        }
    }

    /// Adds a new element to the tree. The current node is not always the right parent when the
    /// markup is malformed.
    fn add_node_to_right_parent(&mut self, document: &mut Document, node: NodeId, tag: &str, location: &Location) {
        let current = self.context.current();
        let current_name = document.tag_name(current).unwrap_or_default().to_string();

        let mut parent = current;
        if tag == "tr" && !is_table_child(&current_name) {
            parent = self.find_on_stack(document, &["tbody", "thead", "tfoot"]);
        } else if is_table_child(tag) && current_name != "table" {
            parent = self.find_on_stack(document, &["table"]);
        } else if is_table_cell(tag) && current_name != "tr" {
            parent = self.find_on_stack(document, &["tr"]);
        }

        if parent != current && current_name == "form" {
            debug!("form {current} is waiting for lost children");
            self.orphan_form = Some(current);
        }

        let parent_name = document.tag_name(parent).unwrap_or_default().to_string();
        let submittable = document
            .element(node)
            .is_some_and(|element| element.kind.is_submittable());

        if is_misplaced_in_table(&parent_name, tag) {
            if tag == "form" {
                self.orphan_form = Some(node);
                document.append_child(parent, node);
            } else if submittable {
                self.place_misplaced_field(document, parent, node, location);
            } else {
                debug!("fostering <{tag}> before the table");
                let table = self.find_on_stack(document, &["table"]);
                Self::insert_before_or_append(document, table, node, parent);
                self.warn(
                    location.clone(),
                    ParserError::MisplacedTableContent,
                    &format!("<{tag}> is not allowed in <{parent_name}>"),
                );
            }
        } else if let Some(head) = self.head.filter(|_| tag == "title" && !self.parsing_inner_head) {
            document.append_child(head, node);
        } else if let Some(form) = self.orphan_form.filter(|_| parent_name == "form") {
            if submittable {
                if let Some(element) = document.element_mut(form) {
                    element.add_lost_child(node);
                }
                let grand_parent = document.parent(parent).unwrap_or(parent);
                document.append_child(grand_parent, node);
            } else {
                let table = self.find_on_stack(document, &["table"]);
                Self::insert_before_or_append(document, table, node, parent);
            }
        } else if let Some(form) = self.orphan_form.filter(|_| submittable) {
            if let Some(element) = document.element_mut(form) {
                element.add_lost_child(node);
            }
            document.append_child(parent, node);
        } else if matches!(tag, "body" | "frameset") && current_name == "head" {
            // body written by a script while the head is open: it becomes a placeholder below
            // <html> that the real body replaces later
            let html = document.parent(current).unwrap_or(current);
            document.append_child(html, node);
        } else {
            document.append_child(parent, node);
        }
    }

    /// A form field that turned up directly inside table structure. It is registered on the form
    /// it logically belongs to and kept out of the table while that form is still open.
    fn place_misplaced_field(&mut self, document: &mut Document, parent: NodeId, node: NodeId, location: &Location) {
        let Some(form) = self.orphan_form.or_else(|| self.form_around_table(document)) else {
            document.append_child(parent, node);
            return;
        };

        debug!("registering {node} as lost child of form {form}");
        if let Some(element) = document.element_mut(form) {
            element.add_lost_child(node);
        }
        self.warn(
            location.clone(),
            ParserError::OrphanFormField,
            "form field inside table structure",
        );

        if self.context.contains(form) {
            let table = self.find_on_stack(document, &["table"]);
            Self::insert_before_or_append(document, table, node, parent);
        } else {
            document.append_child(parent, node);
        }
    }

    /// `<meta http-equiv="X-UA-Compatible" content="IE=...">` forces the document mode
    fn apply_x_ua_compatible(&self, document_mode: &mut Option<u32>, http_equiv: Option<&str>, content: Option<&str>) {
        if http_equiv != Some("X-UA-Compatible") {
            return;
        }
        let Some(mode) = content.and_then(|c| c.strip_prefix("IE=")).map(str::trim) else {
            return;
        };

        let version = self.browser.major_version();
        if mode == "edge" {
            *document_mode = Some(version);
            return;
        }
        if let Ok(value) = mode.parse::<u32>() {
            *document_mode = Some(value.min(version));
        }
    }

    fn trim_legacy_prototypes(&mut self) {
        let quirks = self.page.get().is_quirks_mode();
        if self.has_feature(BrowserFeature::JsDefineGetter) || !quirks {
            return;
        }
        if let Some(host) = self.script_host.as_mut() {
            debug!("removing Array prototype methods for quirks mode");
            host.remove_prototype_properties("Array", LEGACY_ARRAY_METHODS);
        }
    }

    /// Called when the end of an element has been reached
    fn on_all_children_added(&mut self, node: NodeId, postponed: bool) {
        let is_script = {
            let mut page = self.page.get_mut();
            let Some(element) = page.document.element_mut(node) else {
                return;
            };
            element.all_children_added = true;
            element.local_name().eq_ignore_ascii_case("script")
        };

        if !is_script || !self.javascript_enabled {
            return;
        }

        if postponed {
            trace!("postponing script {node}");
            self.postponed_scripts.push(node);
        } else {
            self.run_script(node);
        }
    }

    fn run_script(&mut self, node: NodeId) {
        let source = {
            let page = self.page.get();
            let Some(element) = page.document.element(node) else {
                return;
            };
            if !is_javascript(element.attribute("type"), element.attribute("language")) {
                return;
            }
            page.document.text_content(node)
        };
        if source.trim().is_empty() {
            return;
        }

        let Some(mut host) = self.script_host.take() else {
            return;
        };
        host.execute(&source, self);
        self.script_host = Some(host);

        if !self.page.get().is_parsing_inline_html_snippet() {
            self.run_postponed_scripts();
        }
    }

    fn run_postponed_scripts(&mut self) {
        while !self.postponed_scripts.is_empty() {
            let scripts = std::mem::take(&mut self.postponed_scripts);
            for script in scripts {
                self.run_script(script);
            }
        }
    }

    /// Parses markup at the current insertion point while the current parse is suspended
    pub fn push_input_string(&mut self, markup: &str) {
        let inner = {
            let page = self.page.get();
            ParseContext::inline_snippet(&self.context, &page.document)
        };

        {
            let mut page = self.page.get_mut();
            page.register_parsing_start();
            page.register_inline_snippet_parsing_start();
        }

        let outer = std::mem::replace(&mut self.context, inner);
        self.suspended.push(outer);

        let mut balancer = TagBalancer::with_context(&self.context.context_stack, self.error_logger.clone());
        let mut stream = CharStream::new(None);
        stream.read_from_str(markup);
        let mut scanner = Scanner::new(stream, self.scanner_options.clone(), self.error_logger.clone());
        drive(&mut scanner, &mut balancer, self);

        if let Some(outer) = self.suspended.pop() {
            self.context = outer;
        }

        let mut page = self.page.get_mut();
        page.register_parsing_end();
        page.register_inline_snippet_parsing_end();
    }
}

impl ContentHandler for TreeBuilder {
    fn doctype(
        &mut self,
        name: &str,
        pub_identifier: Option<&str>,
        sys_identifier: Option<&str>,
        _location: Location,
    ) {
        self.flush_text();

        let doctype = DocTypeData::new(
            name,
            pub_identifier.unwrap_or_default(),
            sys_identifier.unwrap_or_default(),
        );

        let mut page = self.page.get_mut();
        page.quirks_mode = identify_quirks_mode(name, pub_identifier, sys_identifier);
        page.document_type = Some(doctype.clone());

        let node = if self.has_feature(BrowserFeature::DoctypeIsComment) {
            page.document.create_comment(&doctype.as_comment_text())
        } else {
            page.document.create_doctype(doctype)
        };
        let root = page.document.root();
        page.document.append_child(root, node);
    }

    fn start_element(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        attributes: &[(String, String)],
        location: Location,
        synthesized: bool,
    ) {
        self.flush_text();

        let tag = name.to_ascii_lowercase();
        let snippet = self.page.get().is_parsing_html_snippet();

        if snippet && (tag == "html" || tag == "body") {
            self.skipped.push(tag);
            return;
        }
        if self.parsing_inner_head && self.has_feature(BrowserFeature::IgnoreContentsOfInnerHead) {
            trace!("skipping <{tag}> in inner head");
            self.skipped.push(tag);
            return;
        }

        let handle = self.page.clone();
        let mut page = handle.get_mut();

        if tag == "head" {
            if self.head_state == HeadState::Parsed || snippet {
                self.parsing_inner_head = true;
                self.skipped.push(tag);
                return;
            }
            self.head_state = if synthesized {
                HeadState::SyntheticallyInserted
            } else {
                HeadState::Parsed
            };
        } else if self.head_state == HeadState::NotYetParsed && (tag == "body" || tag == "frameset") {
            debug!("inserting missing <head>");
            let head = get_element_factory(&self.browser, None, "head").create_element(
                "head",
                None,
                HashMap::new(),
                location.clone(),
            );
            let head = page.document.create_element(head);
            let current = self.context.current();
            page.document.append_child(current, head);
            self.head = Some(head);
            self.head_state = HeadState::SyntheticallyInserted;
            self.warn(location.clone(), ParserError::MissingHead, "head inserted before body");
        }

        // a body created earlier (by a script write) is replaced by the real one
        let old_body = if tag == "body" { page.document.body() } else { None };

        if tag == "form" {
            self.orphan_form = None;
        }

        let namespace = match namespace.map(str::trim) {
            Some(HTML_NAMESPACE) if !self.xhtml => None,
            namespace => namespace,
        };

        let mut attribute_map = HashMap::with_capacity(attributes.len());
        for (key, value) in attributes {
            attribute_map
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        let mut data = get_element_factory(&self.browser, namespace, name).create_element(
            name,
            namespace,
            attribute_map,
            location.clone(),
        );
        if self.javascript_enabled {
            data.behavior = Some(Behavior::default());
            data.register_event_handlers();
        }
        let http_equiv = data.attribute("http-equiv").map(str::to_string);
        let content = data.attribute("content").map(str::to_string);

        let node = page.document.create_element(data);
        self.add_node_to_right_parent(&mut page.document, node, &tag, &location);

        if let Some(old_body) = old_body.filter(|old| *old != node) {
            debug!("moving children of placeholder body {old_body} to {node}");
            page.document.move_children(old_body, node);
            page.document.remove(old_body);
        }

        match tag.as_str() {
            "body" => self.body = Some(node),
            "head" => self.head = Some(node),
            "meta" if self.has_feature(BrowserFeature::MetaXUaCompatible) => {
                let mut document_mode = page.document_mode;
                self.apply_x_ua_compatible(&mut document_mode, http_equiv.as_deref(), content.as_deref());
                page.document_mode = document_mode;
            }
            _ => {}
        }
        drop(page);

        if tag == "html" {
            self.trim_legacy_prototypes();
        }

        self.context.push(node);
    }

    fn end_element(&mut self, name: &str, location: Location, synthesized: bool) {
        self.flush_text();

        let tag = name.to_ascii_lowercase();
        if self.skipped.last() == Some(&tag) {
            self.skipped.pop();
            if tag == "head" {
                self.parsing_inner_head = false;
            }
            return;
        }

        if tag == "form" {
            self.orphan_form = None;
        }

        let Some(node) = self.context.pop() else {
            return;
        };

        let postponed = {
            let mut page = self.page.get_mut();
            let is_form = match page.document.element_mut(node) {
                Some(element) => {
                    element.end_location = Some(location);
                    element.local_name().eq_ignore_ascii_case("form")
                }
                None => false,
            };
            if is_form && synthesized {
                debug!("form {node} closed early, collecting lost children");
                self.orphan_form = Some(node);
            }
            page.is_parsing_inline_html_snippet()
        };

        self.on_all_children_added(node, postponed);
    }

    fn characters(&mut self, text: &str, location: Location) {
        if !self.context.has_pending_text()
            && self.has_feature(BrowserFeature::HtmlParserRemoveEmptyContent)
            && is_blank(text)
        {
            let remove = {
                let page = self.page.get();
                self.remove_empty_characters(&page.document)
            };
            if remove {
                return;
            }
        }
        self.context.append_text(text, location);
    }

    fn comment(&mut self, text: &str, _location: Location) {
        self.flush_text();

        if text.starts_with("[CDATA") && !self.has_feature(BrowserFeature::HtmlCdataAsComment) {
            return;
        }

        let current = self.context.current();
        let mut page = self.page.get_mut();
        let node = page.document.create_comment(text);
        page.document.append_child(current, node);
    }

    fn ignored_start_element(&mut self, name: &str, attributes: &[(String, String)], _location: Location) {
        if name.eq_ignore_ascii_case("body") {
            if let Some(body) = self.body {
                let mut page = self.page.get_mut();
                if let Some(element) = page.document.element_mut(body) {
                    for (key, value) in attributes {
                        let key = key.to_ascii_lowercase();
                        if element.has_attribute(&key) {
                            continue;
                        }
                        element.set_attribute(&key, value);
                        if is_event_handler_attribute(&key) {
                            if let Some(behavior) = element.behavior.as_mut() {
                                behavior.create_event_handler(&key, value);
                            }
                        }
                    }
                }
            }
        }

        if self.head_state == HeadState::Parsed && name.eq_ignore_ascii_case("head") {
            self.parsing_inner_head = true;
        }
    }

    fn ignored_end_element(&mut self, name: &str, _location: Location) {
        if name.eq_ignore_ascii_case("form") {
            self.orphan_form = None;
        }
        if self.parsing_inner_head && name.eq_ignore_ascii_case("head") {
            self.parsing_inner_head = false;
        }
    }

    fn end_document(&mut self, _location: Location) {
        self.flush_text();
        if self.context.kind != ContextKind::InlineSnippet {
            self.run_postponed_scripts();
        }
    }
}

impl ScriptContext for TreeBuilder {
    fn write(&mut self, markup: &str) {
        self.push_input_string(markup);
    }

    fn page(&self) -> PageHandle {
        self.page.clone()
    }
}

fn is_table_child(name: &str) -> bool {
    matches!(name, "thead" | "tbody" | "tfoot" | "caption" | "colgroup")
}

fn is_table_cell(name: &str) -> bool {
    matches!(name, "td" | "th")
}

/// True when `tag` cannot be a child of the table structure element `parent`
fn is_misplaced_in_table(parent: &str, tag: &str) -> bool {
    (parent == "table" && !is_table_child(tag))
        || (is_table_child(parent) && parent != "caption" && parent != "colgroup" && tag != "tr")
        || (parent == "colgroup" && tag != "col")
        || (parent == "tr" && !is_table_cell(tag))
}
