use log::Level;
use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;
use tagsoup_config::ParserOptions;
use tagsoup_html::page::{Page, PageHandle, WindowKind};
use tagsoup_html::parser::listener::{HtmlParserListener, LogListener};
use tagsoup_html::parser::{parse_fragment, parse_fragment_into, parse_html, parse_html_str};
use tagsoup_shared::node::NodeId;
use tagsoup_shared::types::Severity;
use url::Url;

fn new_page(browser: &str) -> Page {
    let url = Url::parse("http://localhost/").unwrap();
    Page::new(url, tagsoup_config::browser(browser).unwrap().clone())
}

#[derive(Default)]
struct RecordingListener {
    errors: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
}

impl HtmlParserListener for RecordingListener {
    fn error(&self, _message: &str, _url: &str, _html: Option<&str>, _line: usize, _column: usize, key: &str) {
        self.errors.borrow_mut().push(key.to_string());
    }

    fn warning(&self, _message: &str, _url: &str, _html: Option<&str>, _line: usize, _column: usize, key: &str) {
        self.warnings.borrow_mut().push(key.to_string());
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
    }
}

#[test]
fn parse_from_reader() {
    let page = PageHandle::create(new_page("FF"));
    parse_html(&page, "<p>from a reader</p>".as_bytes()).unwrap();

    let page = page.get();
    let p = page.document.elements_by_tag("p")[0];
    assert_eq!(page.document.text_content(p), "from a reader");
}

#[test]
fn read_failure_keeps_the_root_cause() {
    let page = PageHandle::create(new_page("FF"));
    let err = parse_html(&page, FailingReader).unwrap_err();

    assert_eq!(err.to_string(), "failed parsing content from http://localhost/");
    assert_eq!(err.root_cause().to_string(), "connection reset");
    assert!(!page.get().is_parsing());
}

#[test]
fn fragment_target_must_exist() {
    let page = PageHandle::create(new_page("FF"));
    let err = parse_fragment_into(&page, NodeId::from(9999usize), "<b>x</b>").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid fragment target: node 9999 is not part of the page"
    );
}

#[test]
fn fragment_uses_separate_context() {
    let page = PageHandle::create(new_page("FF"));
    parse_html_str(&page, "<div></div><table><tr><td>a</td></tr></table>").unwrap();
    let (div, tr) = {
        let page = page.get();
        (
            page.document.elements_by_tag("div")[0],
            page.document.elements_by_tag("tr")[0],
        )
    };

    parse_fragment(&page, div, tr, "<td>x</td>").unwrap();

    let page = page.get();
    let document = &page.document;
    let children = document.children(div);
    assert_eq!(children.len(), 1);
    assert!(document.is_tag(children[0], "td"));
    assert!(!page.is_parsing_html_snippet());
}

#[test]
fn diagnostics_are_returned() {
    let page = PageHandle::create(new_page("FF"));
    let errors = parse_html_str(&page, "<p>x</span><!-- open").unwrap();

    let unmatched = errors.iter().find(|e| e.key == "unmatched-end-tag").unwrap();
    assert_eq!(unmatched.severity, Severity::Warning);
    let eof = errors.iter().find(|e| e.key == "eof-in-comment").unwrap();
    assert_eq!(eof.severity, Severity::Error);
}

#[test]
fn diagnostics_are_forwarded_to_listener() {
    let listener = Rc::new(RecordingListener::default());
    let page = PageHandle::create(new_page("FF").with_listener(listener.clone()));

    parse_html_str(&page, "<body><body><!-- open").unwrap();

    let warnings = listener.warnings.borrow();
    assert!(warnings.contains(&"missing-head".to_string()));
    assert!(warnings.contains(&"duplicate-element".to_string()));
    assert_eq!(listener.errors.borrow().as_slice(), &["eof-in-comment"]);
}

#[test]
fn listener_is_silent_when_reporting_is_off() {
    let listener = Rc::new(RecordingListener::default());
    let options = ParserOptions {
        report_errors: false,
        ..ParserOptions::default()
    };
    let page = PageHandle::create(
        new_page("FF")
            .with_options(options)
            .with_listener(listener.clone()),
    );

    let errors = parse_html_str(&page, "<body><body>").unwrap();
    assert!(!errors.is_empty());
    assert!(listener.warnings.borrow().is_empty());
}

#[test]
fn log_listener_forwards_to_log() {
    testing_logger::setup();
    let page = PageHandle::create(new_page("FF").with_listener(Rc::new(LogListener)));
    parse_html_str(
        &page,
        "<html><head></head><body><table><tr>misplaced</tr></table></body></html>",
    )
    .unwrap();

    testing_logger::validate(|captured_logs| {
        let warnings: Vec<_> = captured_logs
            .iter()
            .filter(|log| log.level == Level::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].body.contains("[misplaced-text]"));
        assert!(warnings[0].body.starts_with("http://localhost/ (1:"));
    });
}

#[test]
fn loading_frame_waits_for_its_parent() {
    let frame = PageHandle::create(new_page("IE8").with_window(WindowKind::Frame { loaded: false }));
    parse_html_str(&frame, "").unwrap();
    assert!(frame.get().document.document_element().is_none());

    let top = PageHandle::create(new_page("IE8"));
    top.get_mut().frames.push(frame.clone());
    parse_html_str(&top, r#"<frameset><frame src="a.html"></frameset>"#).unwrap();

    assert!(top.get().document.body().is_none());
    assert_eq!(top.get().document.elements_by_tag("frameset").len(), 1);
    assert!(frame.get().document.body().is_some());
}

#[test]
fn loading_frame_gets_body_in_firefox() {
    let frame = PageHandle::create(new_page("FF").with_window(WindowKind::Frame { loaded: false }));
    parse_html_str(&frame, "").unwrap();
    assert!(frame.get().document.body().is_some());
}
