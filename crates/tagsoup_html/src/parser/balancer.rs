use crate::node::{HTML_NAMESPACE, SVG_NAMESPACE};
use crate::parser::content_handler::ContentHandler;
use crate::parser::error_logger::{ErrorLogger, ParserError};
use crate::parser::is_blank;
use crate::tokenizer::token::Token;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use tagsoup_shared::byte_stream::Location;

/// Elements that never have content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "isindex", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements that belong in the head when they appear before the body
const HEAD_ELEMENTS: &[&str] = &["base", "link", "meta", "script", "style", "title"];

/// Start tags that close an open paragraph
const PARAGRAPH_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dir", "div", "dl", "fieldset",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "menu",
    "nav", "ol", "p", "pre", "section", "ul",
];

/// Elements that stop the search for a matching end tag
const SCOPE_BOUNDARIES: &[&str] = &[
    "table", "td", "th", "caption", "html", "applet", "object", "marquee",
];

const TABLE_STRUCTURE: &[&str] = &[
    "table", "tbody", "thead", "tfoot", "tr", "td", "th", "caption", "colgroup",
];

const TABLE_SECTIONS: &[&str] = &["tbody", "thead", "tfoot"];

/// Formatting elements that are reopened when a mismatched end tag closed them
const FORMATTING_ELEMENTS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "span", "strike", "strong",
    "tt", "u",
];

#[derive(Clone, Debug)]
struct OpenTag {
    name: String,
    namespace: Option<&'static str>,
    attributes: Vec<(String, String)>,
}

/// Turns a token stream into a balanced stream of element events. Missing `html`, `head`,
/// `body`, `tbody` and `tr` tags are synthesized, implicitly closed elements get a synthesized
/// end, and tags that have no valid place are reported as ignored.
pub struct TagBalancer {
    stack: Vec<OpenTag>,
    /// Number of entries at the bottom of the stack that come from the fragment context. They
    /// are never emitted and never closed.
    context_depth: usize,
    seen_html: bool,
    seen_head: bool,
    seen_body: bool,
    /// `</body>` and `</html>` are only acted upon at the end of the document
    body_closed: bool,
    html_closed: bool,
    error_logger: Rc<RefCell<ErrorLogger>>,
}

impl TagBalancer {
    pub fn new(error_logger: Rc<RefCell<ErrorLogger>>) -> Self {
        Self::with_context(&[], error_logger)
    }

    /// Creates a balancer that behaves as if the given elements (outermost first) are open
    pub fn with_context(context: &[String], error_logger: Rc<RefCell<ErrorLogger>>) -> Self {
        let mut stack: Vec<OpenTag> = Vec::with_capacity(context.len());
        for name in context {
            let in_svg = stack.last().is_some_and(|t| t.namespace == Some(SVG_NAMESPACE));
            stack.push(OpenTag {
                name: name.clone(),
                namespace: Some(namespace_for(name, in_svg)),
                attributes: Vec::new(),
            });
        }

        let has = |tag: &str| context.iter().any(|n| n == tag);
        let seen_body = has("body") || has("frameset");

        Self {
            context_depth: stack.len(),
            stack,
            seen_html: has("html"),
            seen_head: seen_body || has("head"),
            seen_body,
            body_closed: false,
            html_closed: false,
            error_logger,
        }
    }

    /// Processes a single token. `Token::Eof` finishes the document.
    pub fn process(&mut self, token: Token, handler: &mut dyn ContentHandler) {
        match token {
            Token::DocType {
                name,
                pub_identifier,
                sys_identifier,
                location,
            } => handler.doctype(
                &name,
                pub_identifier.as_deref(),
                sys_identifier.as_deref(),
                location,
            ),
            Token::StartTag {
                name,
                attributes,
                is_self_closing,
                location,
            } => self.start_tag(&name, attributes, is_self_closing, location, handler),
            Token::EndTag { name, location } => self.end_tag(&name, location, handler),
            Token::Comment { comment, location } => handler.comment(&comment, location),
            Token::Text { text, location } => self.text(&text, location, handler),
            Token::Eof { location } => self.finish(location, handler),
        }
    }

    /// Closes everything that is still open and ends the document
    pub fn finish(&mut self, location: Location, handler: &mut dyn ContentHandler) {
        while self.stack.len() > self.context_depth {
            let literal = match self.current_name() {
                Some("body") => self.body_closed,
                Some("html") => self.html_closed,
                _ => false,
            };
            self.close_top(location.clone(), !literal, handler);
        }
        handler.end_document(location);
    }

    fn current_name(&self) -> Option<&str> {
        self.stack.last().map(|t| t.name.as_str())
    }

    /// Index of the topmost open element with one of the given names. The search stops at the
    /// first boundary element that is not itself a match.
    fn position(&self, names: &[&str], boundaries: &[&str]) -> Option<usize> {
        for (index, tag) in self.stack.iter().enumerate().rev() {
            if names.contains(&tag.name.as_str()) {
                return Some(index);
            }
            if boundaries.contains(&tag.name.as_str()) {
                return None;
            }
        }
        None
    }

    fn open(
        &mut self,
        name: &str,
        attributes: Vec<(String, String)>,
        location: Location,
        synthesized: bool,
        handler: &mut dyn ContentHandler,
    ) {
        let in_svg = self
            .stack
            .last()
            .is_some_and(|t| t.namespace == Some(SVG_NAMESPACE));
        let namespace = namespace_for(name, in_svg);

        handler.start_element(name, Some(namespace), &attributes, location, synthesized);
        self.stack.push(OpenTag {
            name: name.to_string(),
            namespace: Some(namespace),
            attributes,
        });
    }

    fn close_top(&mut self, location: Location, synthesized: bool, handler: &mut dyn ContentHandler) {
        if self.stack.len() <= self.context_depth {
            return;
        }
        if let Some(tag) = self.stack.pop() {
            handler.end_element(&tag.name, location, synthesized);
        }
    }

    /// Closes (synthesized) every element above the given index
    fn close_above(&mut self, index: usize, location: &Location, handler: &mut dyn ContentHandler) {
        let keep = usize::max(index + 1, self.context_depth);
        while self.stack.len() > keep {
            self.close_top(location.clone(), true, handler);
        }
    }

    /// Closes (synthesized) the element at the given index and everything above it
    fn close_including(&mut self, index: usize, location: &Location, handler: &mut dyn ContentHandler) {
        if index < self.context_depth {
            return;
        }
        while self.stack.len() > index {
            self.close_top(location.clone(), true, handler);
        }
    }

    fn ignore_start(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
        location: Location,
        handler: &mut dyn ContentHandler,
    ) {
        debug!("ignoring start tag <{name}>");
        let kind = if TABLE_STRUCTURE.contains(&name) || name == "col" {
            ParserError::MisplacedTableContent
        } else {
            ParserError::DuplicateElement
        };
        self.error_logger.borrow_mut().add_error(
            location.clone(),
            kind,
            &format!("start tag <{name}> ignored"),
        );
        handler.ignored_start_element(name, attributes, location);
    }

    fn ensure_html(&mut self, location: &Location, handler: &mut dyn ContentHandler) {
        if !self.seen_html {
            self.seen_html = true;
            self.open("html", Vec::new(), location.clone(), true, handler);
        }
    }

    /// Makes sure body content can be emitted: the head is closed and a body is open
    fn ensure_body(&mut self, location: &Location, handler: &mut dyn ContentHandler) {
        self.ensure_html(location, handler);
        if let Some(index) = self.position(&["head"], &[]) {
            self.close_including(index, location, handler);
        }
        if !self.seen_body {
            self.seen_body = true;
            self.seen_head = true;
            self.open("body", Vec::new(), location.clone(), true, handler);
        }
    }

    fn text(&mut self, text: &str, location: Location, handler: &mut dyn ContentHandler) {
        let blank = is_blank(text);
        match self.current_name() {
            None if blank => return,
            None | Some("html") | Some("head") if !blank => {
                self.ensure_body(&location, handler);
            }
            _ => {}
        }
        handler.characters(text, location);
    }

    fn start_tag(
        &mut self,
        name: &str,
        attributes: Vec<(String, String)>,
        is_self_closing: bool,
        location: Location,
        handler: &mut dyn ContentHandler,
    ) {
        match name {
            "html" => {
                if self.seen_html {
                    self.ignore_start(name, &attributes, location, handler);
                    return;
                }
                self.seen_html = true;
                self.open(name, attributes, location, false, handler);
                return;
            }
            "head" => {
                if self.seen_head || self.seen_body {
                    self.ignore_start(name, &attributes, location, handler);
                    return;
                }
                self.ensure_html(&location, handler);
                self.seen_head = true;
                self.open(name, attributes, location, false, handler);
                return;
            }
            "body" | "frameset" => {
                if self.seen_body {
                    self.ignore_start(name, &attributes, location, handler);
                    return;
                }
                self.ensure_html(&location, handler);
                if let Some(index) = self.position(&["head"], &[]) {
                    self.close_including(index, &location, handler);
                }
                self.seen_body = true;
                self.seen_head = true;
                self.open(name, attributes, location, false, handler);
                return;
            }
            _ => {}
        }

        if HEAD_ELEMENTS.contains(&name) && !self.seen_body && self.head_is_available() {
            self.ensure_html(&location, handler);
            if !self.seen_head {
                self.seen_head = true;
                self.open("head", Vec::new(), location.clone(), true, handler);
            }
        } else if !self.seen_body || self.position(&["head"], &[]).is_some() {
            self.ensure_body(&location, handler);
        }

        if !self.fix_structure(name, &attributes, &location, handler) {
            return;
        }

        let void = VOID_ELEMENTS.contains(&name) || is_self_closing;
        self.open(name, attributes, location.clone(), false, handler);
        if void {
            self.close_top(location, false, handler);
        }
    }

    /// The head can receive content when it is open or was never seen
    fn head_is_available(&self) -> bool {
        !self.seen_head || self.current_name() == Some("head")
    }

    /// Applies implicit closes and table fixups before the given start tag is opened. Returns
    /// false when the tag has to be ignored.
    fn fix_structure(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
        location: &Location,
        handler: &mut dyn ContentHandler,
    ) -> bool {
        if PARAGRAPH_CLOSERS.contains(&name) {
            if let Some(index) = self.position(&["p"], SCOPE_BOUNDARIES) {
                self.close_including(index, location, handler);
            }
        }

        match name {
            "li" => {
                if let Some(index) = self.position(&["li"], &["ul", "ol", "table", "td", "th"]) {
                    self.close_including(index, location, handler);
                }
            }
            "dd" | "dt" => {
                if let Some(index) = self.position(&["dd", "dt"], &["dl", "table", "td", "th"]) {
                    self.close_including(index, location, handler);
                }
            }
            "option" => {
                if self.current_name() == Some("option") {
                    self.close_top(location.clone(), true, handler);
                }
            }
            "optgroup" => {
                if let Some(index) = self.position(&["option", "optgroup"], &["select"]) {
                    self.close_including(index, location, handler);
                }
            }
            "tr" | "td" | "th" | "tbody" | "thead" | "tfoot" | "caption" | "colgroup" | "col" => {
                return self.fix_table_structure(name, attributes, location, handler);
            }
            _ => {}
        }
        true
    }

    fn fix_table_structure(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
        location: &Location,
        handler: &mut dyn ContentHandler,
    ) -> bool {
        let Some(table) = self.position(&["table"], &[]) else {
            debug!("no open table for <{name}>");
            self.ignore_start(name, attributes, location.clone(), handler);
            return false;
        };

        match name {
            "td" | "th" => {
                if let Some(index) = self.position(&["td", "th"], &["table"]) {
                    self.close_including(index, location, handler);
                }
                if let Some(index) = self.position(&["tr", "tbody", "thead", "tfoot", "table"], &[]) {
                    self.close_above(index, location, handler);
                }
                if self.current_name() == Some("table") {
                    self.open("tbody", Vec::new(), location.clone(), true, handler);
                }
                if self
                    .current_name()
                    .is_some_and(|n| TABLE_SECTIONS.contains(&n))
                {
                    self.open("tr", Vec::new(), location.clone(), true, handler);
                }
            }
            "tr" => {
                if let Some(index) = self.position(&["tr"], &["table"]) {
                    self.close_including(index, location, handler);
                }
                if let Some(index) = self.position(&["tbody", "thead", "tfoot", "table"], &[]) {
                    self.close_above(index, location, handler);
                }
                if self.current_name() == Some("table") {
                    self.open("tbody", Vec::new(), location.clone(), true, handler);
                }
            }
            "col" => {
                if self.current_name() != Some("colgroup") {
                    self.close_above(table, location, handler);
                    self.open("colgroup", Vec::new(), location.clone(), true, handler);
                }
            }
            _ => self.close_above(table, location, handler),
        }
        true
    }

    fn end_tag(&mut self, name: &str, location: Location, handler: &mut dyn ContentHandler) {
        match name {
            "body" => {
                self.body_closed = true;
                return;
            }
            "html" => {
                self.html_closed = true;
                return;
            }
            _ => {}
        }

        let table_structure = TABLE_STRUCTURE.contains(&name);
        let boundaries: &[&str] = if table_structure { &["table"] } else { SCOPE_BOUNDARIES };

        let index = match self.position(&[name], boundaries) {
            Some(index) if index >= self.context_depth => index,
            _ => {
                debug!("ignoring end tag </{name}>");
                self.error_logger.borrow_mut().add_error(
                    location.clone(),
                    ParserError::UnmatchedEndTag,
                    &format!("end tag </{name}> does not match an open element"),
                );
                handler.ignored_end_element(name, location);
                return;
            }
        };

        let mut reopen = Vec::new();
        while self.stack.len() > index + 1 {
            if let Some(tag) = self.stack.last() {
                if FORMATTING_ELEMENTS.contains(&tag.name.as_str()) {
                    reopen.push(tag.clone());
                }
            }
            self.close_top(location.clone(), true, handler);
        }
        self.close_top(location.clone(), false, handler);

        if table_structure || name == "head" {
            return;
        }
        for tag in reopen.into_iter().rev() {
            self.open(&tag.name, tag.attributes, location.clone(), true, handler);
        }
    }
}

fn namespace_for(name: &str, in_svg: bool) -> &'static str {
    if in_svg || name == "svg" {
        SVG_NAMESPACE
    } else {
        HTML_NAMESPACE
    }
}
