use tagsoup_html::node::NodeData;
use tagsoup_html::page::{Page, PageHandle};
use tagsoup_html::parser::parse_html_str;
use test_case::test_case;
use url::Url;

fn parse(browser: &str, html: &str) -> PageHandle {
    let url = Url::parse("http://localhost/").unwrap();
    let browser = tagsoup_config::browser(browser).unwrap().clone();
    let page = PageHandle::create(Page::new(url, browser));
    parse_html_str(&page, html).unwrap();
    page
}

/// Describes the children of the first `<p>`
fn paragraph(page: &PageHandle) -> Vec<String> {
    let page = page.get();
    let document = &page.document;
    let p = document.elements_by_tag("p")[0];
    document
        .children(p)
        .iter()
        .map(|id| match &document.node(*id).unwrap().data {
            NodeData::Text(text) => format!("text:{}", text.value),
            NodeData::Comment(_) => "comment".to_string(),
            NodeData::Element(element) => format!("<{}>", element.name),
            data => format!("{data:?}"),
        })
        .collect()
}

#[test_case("IE8", &["text:X"])]
#[test_case("IE9", &[])]
#[test_case("FF", &["comment"])]
fn lt_ie_9(browser: &str, expected: &[&str]) {
    let page = parse(browser, "<p><!--[if lt IE 9]>X<![endif]--></p>");
    assert_eq!(paragraph(&page), expected);
}

#[test_case("IE8", &["<b>"])]
#[test_case("IE9", &["<b>"])]
#[test_case("FF", &["comment"])]
fn markup_in_true_condition(browser: &str, expected: &[&str]) {
    let page = parse(browser, "<p><!--[if IE]><b>ie</b><![endif]--></p>");
    assert_eq!(paragraph(&page), expected);
}

#[test_case("IE8", &["text:Y"])]
#[test_case("IE9", &["comment"])]
fn downlevel_revealed(browser: &str, expected: &[&str]) {
    let page = parse(browser, "<p><![if lt IE 9]>Y<![endif]></p>");
    assert_eq!(paragraph(&page), expected);
}

#[test]
fn downlevel_revealed_is_content_for_other_browsers() {
    let page = parse("FF", "<p><![if lt IE 9]>Y<![endif]></p>");
    assert_eq!(paragraph(&page), &["text:Y"]);
}

#[test]
fn invalid_condition_is_kept_as_text() {
    let url = Url::parse("http://localhost/").unwrap();
    let browser = tagsoup_config::browser("IE8").unwrap().clone();
    let page = PageHandle::create(Page::new(url, browser));

    let errors = parse_html_str(&page, "<p><!--[if lt IE]>Z<![endif]--></p>").unwrap();
    assert!(errors.iter().any(|e| e.key == "invalid-conditional-comment"));
    assert_eq!(paragraph(&page), &["text:<!--[if lt IE]>Z<![endif]-->"]);
}
