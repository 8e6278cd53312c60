use std::cell::RefCell;
use std::rc::Rc;
use tagsoup_config::ParserOptions;
use tagsoup_html::page::{Page, PageHandle};
use tagsoup_html::parser::HtmlParser;
use tagsoup_html::script::{ScriptContext, ScriptHost, LEGACY_ARRAY_METHODS};
use test_case::test_case;
use url::Url;

/// Records what the parser asks of it. Understands a single `document.write("...")` call.
#[derive(Default, Clone)]
struct MockHost {
    executed: Rc<RefCell<Vec<String>>>,
    removed: Rc<RefCell<Vec<(String, Vec<String>)>>>,
    parsing: Rc<RefCell<Vec<bool>>>,
}

impl ScriptHost for MockHost {
    fn execute(&mut self, script: &str, context: &mut dyn ScriptContext) {
        self.executed.borrow_mut().push(script.to_string());
        self.parsing.borrow_mut().push(context.page().get().is_parsing());

        let Some(argument) = script
            .trim()
            .strip_prefix("document.write(")
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return;
        };
        let markup = &argument[1..argument.len() - 1];
        context.write(&markup.replace("<\\/", "</"));
    }

    fn remove_prototype_properties(&mut self, class: &str, properties: &[&str]) {
        self.removed.borrow_mut().push((
            class.to_string(),
            properties.iter().map(|p| p.to_string()).collect(),
        ));
    }
}

fn page(browser: &str) -> PageHandle {
    let url = Url::parse("http://localhost/script.html").unwrap();
    let browser = tagsoup_config::browser(browser).unwrap().clone();
    PageHandle::create(Page::new(url, browser))
}

fn run(page: &PageHandle, html: &str) -> MockHost {
    let host = MockHost::default();
    let mut parser = HtmlParser::new(page.clone()).with_script_host(Box::new(host.clone()));
    parser.parse_str(html).unwrap();
    host
}

#[test]
fn written_markup_follows_the_script() {
    let page = page("FF");
    let host = run(
        &page,
        "<div><script>document.write('<span>w</span>')</script><p>after</p></div>",
    );

    let page = page.get();
    let document = &page.document;
    let div = document.elements_by_tag("div")[0];
    let script = document.elements_by_tag("script")[0];
    let span = document.elements_by_tag("span")[0];
    let p = document.elements_by_tag("p")[0];

    assert_eq!(document.children(div), &[script, span, p]);
    assert_eq!(document.text_content(span), "w");
    assert_eq!(host.executed.borrow().len(), 1);
    assert_eq!(host.parsing.borrow().as_slice(), &[true]);
    assert!(!page.is_parsing());
    assert!(!page.is_parsing_inline_html_snippet());
}

#[test]
fn script_written_by_script_runs_after_the_write() {
    let page = page("FF");
    let host = run(
        &page,
        r#"<div><script>document.write("<script>document.write('<b>n</b>')<\/script><i>after</i>")</script></div>"#,
    );

    let executed = host.executed.borrow();
    assert_eq!(executed.len(), 2);
    assert_eq!(executed[1], "document.write('<b>n</b>')");

    let page = page.get();
    let document = &page.document;
    let div = document.elements_by_tag("div")[0];
    let scripts = document.elements_by_tag("script");
    let i = document.elements_by_tag("i")[0];
    let b = document.elements_by_tag("b")[0];
    assert_eq!(document.children(div), &[scripts[0], scripts[1], i, b]);
}

#[test]
fn body_written_in_head_is_replaced_by_real_body() {
    let page = page("FF");
    run(
        &page,
        r#"<html><head><script>document.write('<div id="early">written</div>')</script></head><body id="real"><p>after</p></body></html>"#,
    );

    let page = page.get();
    let document = &page.document;
    let bodies = document.elements_by_tag("body");
    assert_eq!(bodies.len(), 1);
    assert_eq!(document.element(bodies[0]).unwrap().attribute("id"), Some("real"));

    let div = document.elements_by_tag("div")[0];
    let p = document.elements_by_tag("p")[0];
    assert_eq!(document.children(bodies[0]), &[div, p]);
    assert_eq!(document.text_content(div), "written");

    let html = document.document_element().unwrap();
    assert_eq!(document.children(html).len(), 2);
}

#[test_case("<script type=\"text/template\">document.write('x')</script>")]
#[test_case("<script language=\"vbscript\">document.write('x')</script>")]
#[test_case("<script>   </script>")]
fn script_is_not_executed(html: &str) {
    let page = page("FF");
    let host = run(&page, html);
    assert!(host.executed.borrow().is_empty());
}

#[test]
fn scripts_do_not_run_when_javascript_is_disabled() {
    let url = Url::parse("http://localhost/").unwrap();
    let browser = tagsoup_config::browser("FF").unwrap().clone();
    let options = ParserOptions {
        javascript_enabled: false,
        ..ParserOptions::default()
    };
    let page = PageHandle::create(Page::new(url, browser).with_options(options));

    let host = run(&page, "<script>document.write('<b>x</b>')</script>");
    assert!(host.executed.borrow().is_empty());
    assert!(page.get().document.elements_by_tag("b").is_empty());

    let body = page.get().document.body().unwrap();
    assert!(page.get().document.element(body).unwrap().behavior.is_none());
}

#[test_case("IE8", "<p>x", true)]
#[test_case("IE8", "<!DOCTYPE html><p>x", false)]
#[test_case("FF", "<p>x", false)]
fn legacy_array_methods_are_removed_in_quirks_mode(browser: &str, html: &str, removed: bool) {
    let page = page(browser);
    let host = run(&page, html);

    let calls = host.removed.borrow();
    if removed {
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Array");
        assert_eq!(calls[0].1, LEGACY_ARRAY_METHODS);
    } else {
        assert!(calls.is_empty());
    }
}

#[test]
fn host_is_handed_back() {
    let page = page("FF");
    let host = MockHost::default();
    let mut parser = HtmlParser::new(page).with_script_host(Box::new(host.clone()));
    parser.parse_str("<script>a()</script><p><script>b()</script>").unwrap();

    assert!(parser.into_script_host().is_some());
    assert_eq!(host.executed.borrow().as_slice(), &["a()", "b()"]);
}
