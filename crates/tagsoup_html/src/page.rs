use crate::document::Document;
use crate::node::data::doctype::DocTypeData;
use crate::parser::listener::HtmlParserListener;
use crate::parser::quirks::QuirksMode;
use core::fmt::Debug;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt::Formatter;
use std::rc::Rc;
use tagsoup_config::{BrowserFeature, BrowserVersion, ParserOptions};
use url::Url;

/// Kind of window a page is displayed in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowKind {
    /// A top level browser window
    TopLevel,
    /// A (possibly not yet loaded) nested frame or iframe
    Frame { loaded: bool },
}

/// A page is a document together with everything the parser needs to know about where it
/// came from and who is looking at it.
pub struct Page {
    pub document: Document,
    pub url: Url,
    pub browser: BrowserVersion,
    pub options: ParserOptions,
    /// Quirks mode as determined by the doctype. Pages without a doctype are in quirks mode.
    pub quirks_mode: QuirksMode,
    /// Document mode forced through `<meta http-equiv="X-UA-Compatible">`
    pub document_mode: Option<u32>,
    pub document_type: Option<DocTypeData>,
    pub window: WindowKind,
    /// Pages of the frames nested in this page
    pub frames: Vec<PageHandle>,
    /// Optional sink for parse warnings and errors
    pub listener: Option<Rc<dyn HtmlParserListener>>,
    parsing: usize,
    snippet: usize,
    inline_snippet: usize,
}

impl Debug for Page {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url.as_str())
            .field("browser", &self.browser.name)
            .field("quirks_mode", &self.quirks_mode)
            .field("document_mode", &self.document_mode)
            .field("window", &self.window)
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl Page {
    pub fn new(url: Url, browser: BrowserVersion) -> Self {
        Self {
            document: Document::new(),
            url,
            browser,
            options: ParserOptions::default(),
            quirks_mode: QuirksMode::Quirks,
            document_mode: None,
            document_type: None,
            window: WindowKind::TopLevel,
            frames: Vec::new(),
            listener: None,
            parsing: 0,
            snippet: 0,
            inline_snippet: 0,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: WindowKind) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Rc<dyn HtmlParserListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn has_feature(&self, feature: BrowserFeature) -> bool {
        self.browser.has_feature(feature)
    }

    pub fn is_xhtml(&self) -> bool {
        self.options.xhtml
    }

    pub fn is_quirks_mode(&self) -> bool {
        self.quirks_mode == QuirksMode::Quirks
    }

    pub fn register_parsing_start(&mut self) {
        self.parsing += 1;
    }

    pub fn register_parsing_end(&mut self) {
        self.parsing = self.parsing.saturating_sub(1);
    }

    pub fn is_parsing(&self) -> bool {
        self.parsing > 0
    }

    pub fn register_snippet_parsing_start(&mut self) {
        self.snippet += 1;
    }

    pub fn register_snippet_parsing_end(&mut self) {
        self.snippet = self.snippet.saturating_sub(1);
    }

    /// True while a fragment (or inline snippet) is being parsed into this page
    pub fn is_parsing_html_snippet(&self) -> bool {
        self.snippet > 0
    }

    pub fn register_inline_snippet_parsing_start(&mut self) {
        self.inline_snippet += 1;
    }

    pub fn register_inline_snippet_parsing_end(&mut self) {
        self.inline_snippet = self.inline_snippet.saturating_sub(1);
    }

    /// True while markup written by a script is being parsed into this page
    pub fn is_parsing_inline_html_snippet(&self) -> bool {
        self.inline_snippet > 0
    }
}

/// Shared handle to a page. The parser, nested frames and the caller all hold one.
#[derive(Clone, Debug)]
pub struct PageHandle(Rc<RefCell<Page>>);

impl PageHandle {
    pub fn create(page: Page) -> Self {
        Self(Rc::new(RefCell::new(page)))
    }

    pub fn get(&self) -> Ref<'_, Page> {
        self.0.borrow()
    }

    pub fn get_mut(&self) -> RefMut<'_, Page> {
        self.0.borrow_mut()
    }

    /// Returns true when both handles point to the same page
    pub fn ptr_eq(&self, other: &PageHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        let url = Url::parse("http://localhost/").unwrap();
        Page::new(url, tagsoup_config::default_browser())
    }

    #[test]
    fn parsing_counters() {
        let mut page = page();
        assert!(!page.is_parsing());
        page.register_parsing_start();
        page.register_inline_snippet_parsing_start();
        assert!(page.is_parsing());
        assert!(page.is_parsing_inline_html_snippet());
        page.register_inline_snippet_parsing_end();
        page.register_inline_snippet_parsing_end();
        assert!(!page.is_parsing_inline_html_snippet());
        page.register_parsing_end();
        assert!(!page.is_parsing());
    }

    #[test]
    fn handles_share_the_page() {
        let handle = PageHandle::create(page());
        let other = handle.clone();
        other.get_mut().document_mode = Some(8);
        assert_eq!(handle.get().document_mode, Some(8));
        assert!(handle.ptr_eq(&other));
        assert!(handle.get().is_quirks_mode());
    }
}
