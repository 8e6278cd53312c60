//! Tag soup parser
//!
//! Parsing is split in three stages. The [`Scanner`] splits the markup into tokens, the
//! [`TagBalancer`] turns those into a balanced stream of element events (inferring missing
//! tags and dropping the ones that have no place), and the [`TreeBuilder`] adds the nodes to
//! the document, repairing what browsers repair: content misplaced in tables is moved before
//! the table, fields of forms that were closed too early are still registered on their form,
//! and a duplicate `<body>` merges its attributes into the first one.

pub mod balancer;
pub mod content_handler;
pub mod context;
pub mod error_logger;
pub mod fixup;
pub mod listener;
pub mod quirks;
pub mod tree_builder;

use crate::element_factory::{self, ElementFactory};
use crate::errors::Error;
use crate::page::{Page, PageHandle};
use crate::parser::balancer::TagBalancer;
use crate::parser::content_handler::ContentHandler;
use crate::parser::context::{fragment_context_stack, ParseContext};
use crate::parser::error_logger::ErrorLogger;
use crate::parser::fixup::ensure_body_present;
use crate::parser::tree_builder::TreeBuilder;
use crate::script::ScriptHost;
use crate::tokenizer::{Scanner, ScannerOptions};
use log::debug;
use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;
use tagsoup_shared::byte_stream::CharStream;
use tagsoup_shared::node::NodeId;
use tagsoup_shared::types::{self, ParseError, Result};

/// Whitespace in the sense of the markup. A non-breaking space is content.
pub(crate) fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() && c != '\u{00A0}')
}

/// Feeds every token of the scanner through the balancer into the handler
pub(crate) fn drive(scanner: &mut Scanner, balancer: &mut TagBalancer, handler: &mut dyn ContentHandler) {
    handler.start_document();
    loop {
        let token = scanner.next_token();
        let eof = token.is_eof();
        balancer.process(token, handler);
        if eof {
            break;
        }
    }
}

/// Parses documents and fragments into a page
pub struct HtmlParser {
    page: PageHandle,
    script_host: Option<Box<dyn ScriptHost>>,
}

impl HtmlParser {
    pub fn new(page: PageHandle) -> Self {
        Self {
            page,
            script_host: None,
        }
    }

    /// Scripts are executed by the given host as soon as they are parsed
    #[must_use]
    pub fn with_script_host(mut self, host: Box<dyn ScriptHost>) -> Self {
        self.script_host = Some(host);
        self
    }

    pub fn into_script_host(self) -> Option<Box<dyn ScriptHost>> {
        self.script_host
    }

    fn error_logger(&self, html: Option<&str>) -> Rc<RefCell<ErrorLogger>> {
        let page = self.page.get();
        let logger = match page.listener.clone() {
            Some(listener) if page.options.report_errors => {
                ErrorLogger::with_listener(listener, page.url.as_str(), html.map(str::to_string))
            }
            _ => ErrorLogger::new(),
        };
        Rc::new(RefCell::new(logger))
    }

    /// Parses a complete document. Only a failure to read the markup is an error; the
    /// problems found in the markup itself are returned.
    pub fn parse(&mut self, reader: impl Read) -> Result<Vec<ParseError>> {
        let mut stream = CharStream::new(None);
        if let Err(err) = stream.read_from(reader) {
            let url = self.page.get().url.to_string();
            return Err(types::Error::Parse {
                url,
                source: Box::new(types::Error::IO(err)),
            }
            .into());
        }
        Ok(self.parse_document(stream))
    }

    pub fn parse_str(&mut self, html: &str) -> Result<Vec<ParseError>> {
        let mut stream = CharStream::new(None);
        stream.read_from_str(html);
        Ok(self.parse_document(stream))
    }

    fn parse_document(&mut self, stream: CharStream) -> Vec<ParseError> {
        let logger = self.error_logger(None);
        let options = ScannerOptions::for_page(&self.page.get(), false);

        let context = ParseContext::document(NodeId::root());
        let mut builder = TreeBuilder::new(self.page.clone(), context, logger.clone())
            .with_script_host(self.script_host.take());
        let mut scanner = Scanner::new(stream, options, logger.clone());
        let mut balancer = TagBalancer::new(logger.clone());

        self.page.get_mut().register_parsing_start();
        drive(&mut scanner, &mut balancer, &mut builder);
        self.page.get_mut().register_parsing_end();

        let body_seen = builder.body().is_some();
        self.script_host = builder.into_script_host();
        ensure_body_present(&self.page, true, body_seen);

        let errors = logger.borrow().get_errors();
        errors
    }

    /// Parses `source` into `parent` as if it were located below `context`
    pub fn parse_fragment(&mut self, parent: NodeId, context: NodeId, source: &str) -> Result<Vec<ParseError>> {
        let parse_context = {
            let page = self.page.get();
            if page.document.node(parent).is_none() {
                return Err(Error::FragmentTarget(format!("node {parent} is not part of the page")).into());
            }
            let context_stack = fragment_context_stack(&page.document, context);
            debug!("fragment context: {}", context_stack.join(" > "));
            ParseContext::fragment(&page.document, parent, context_stack)
        };

        let logger = self.error_logger(Some(source));
        let options = ScannerOptions::for_page(&self.page.get(), true);

        let mut balancer = TagBalancer::with_context(&parse_context.context_stack, logger.clone());
        let mut builder = TreeBuilder::new(self.page.clone(), parse_context, logger.clone())
            .with_script_host(self.script_host.take());
        let mut stream = CharStream::new(None);
        stream.read_from_str(source);
        let mut scanner = Scanner::new(stream, options, logger.clone());

        {
            let mut page = self.page.get_mut();
            page.register_parsing_start();
            page.register_snippet_parsing_start();
        }
        drive(&mut scanner, &mut balancer, &mut builder);
        {
            let mut page = self.page.get_mut();
            page.register_parsing_end();
            page.register_snippet_parsing_end();
        }

        self.script_host = builder.into_script_host();
        let errors = logger.borrow().get_errors();
        Ok(errors)
    }
}

/// Parses the markup read from `reader` into the page
pub fn parse_html(page: &PageHandle, reader: impl Read) -> Result<Vec<ParseError>> {
    HtmlParser::new(page.clone()).parse(reader)
}

pub fn parse_html_str(page: &PageHandle, html: &str) -> Result<Vec<ParseError>> {
    HtmlParser::new(page.clone()).parse_str(html)
}

/// Parses a fragment into `parent`. Tags are balanced as if the fragment was located below
/// `context`.
pub fn parse_fragment(page: &PageHandle, parent: NodeId, context: NodeId, source: &str) -> Result<Vec<ParseError>> {
    HtmlParser::new(page.clone()).parse_fragment(parent, context, source)
}

/// Parses a fragment into `parent`, using the parent itself as context
pub fn parse_fragment_into(page: &PageHandle, parent: NodeId, source: &str) -> Result<Vec<ParseError>> {
    parse_fragment(page, parent, parent, source)
}

/// Returns the factory for a plain HTML tag
pub fn get_factory(tag_name: &str) -> &'static dyn ElementFactory {
    element_factory::get_factory(tag_name)
}

/// Returns the factory for a (namespaced) element created in the given page
pub fn get_element_factory(page: &Page, namespace: Option<&str>, qualified_name: &str) -> &'static dyn ElementFactory {
    element_factory::get_element_factory(&page.browser, namespace, qualified_name)
}
