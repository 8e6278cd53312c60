use crate::element_factory::get_element_factory;
use crate::page::{PageHandle, WindowKind};
use log::debug;
use std::collections::HashMap;
use tagsoup_config::BrowserFeature;
use tagsoup_shared::byte_stream::Location;

/// Adds an empty `<body>` to the page when the parse did not produce a body or frameset.
///
/// Browsers that wait for the whole page to load before creating the bodies of frames skip
/// pages in frames that are still loading; the fixup for those pages is done when the top level
/// page calls this for its nested frames. `check_inside_frame_only` is set when the page had a
/// body that was removed again, in which case only the frames are checked.
pub fn ensure_body_present(page: &PageHandle, original_call: bool, check_inside_frame_only: bool) {
    let wait_to_load = page.get().has_feature(BrowserFeature::PageWaitLoadBeforeBody);
    if original_call && wait_to_load && page.get().window == (WindowKind::Frame { loaded: false }) {
        debug!("deferring body creation until the frame is loaded");
        return;
    }

    if !check_inside_frame_only {
        add_missing_body(page);
    }

    if wait_to_load {
        let frames = page.get().frames.clone();
        for frame in frames {
            ensure_body_present(&frame, false, false);
        }
    }
}

fn add_missing_body(page: &PageHandle) {
    let mut page = page.get_mut();
    let browser = page.browser.clone();
    let document = &mut page.document;

    let html = match document.document_element() {
        Some(html) => html,
        None => {
            let data = get_element_factory(&browser, None, "html").create_element(
                "html",
                None,
                HashMap::new(),
                Location::default(),
            );
            let html = document.create_element(data);
            let root = document.root();
            document.append_child(root, html);
            html
        }
    };

    let has_body = document
        .children(html)
        .iter()
        .any(|child| document.is_tag(*child, "body") || document.is_tag(*child, "frameset"));
    if has_body {
        return;
    }

    debug!("adding missing body");
    let data = get_element_factory(&browser, None, "body").create_element(
        "body",
        None,
        HashMap::new(),
        Location::default(),
    );
    let body = document.create_element(data);
    document.append_child(html, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use url::Url;

    fn page(browser: &str, window: WindowKind) -> PageHandle {
        let url = Url::parse("http://localhost/frame.html").unwrap();
        let browser = tagsoup_config::browser(browser).unwrap().clone();
        PageHandle::create(Page::new(url, browser).with_window(window))
    }

    #[test]
    fn body_is_added_to_empty_page() {
        let page = page("FF", WindowKind::TopLevel);
        ensure_body_present(&page, true, false);
        let page = page.get();
        assert!(page.document.body().is_some());
        assert_eq!(page.document.to_string(), "└─ Document\n   └─ <html>\n      └─ <body>\n");
    }

    #[test]
    fn existing_body_is_kept() {
        let page = page("FF", WindowKind::TopLevel);
        ensure_body_present(&page, true, false);
        ensure_body_present(&page, true, false);
        assert_eq!(page.get().document.elements_by_tag("body").len(), 1);
    }

    #[test]
    fn loading_frames_are_deferred() {
        let ie = page("IE8", WindowKind::Frame { loaded: false });
        ensure_body_present(&ie, true, false);
        assert!(ie.get().document.body().is_none());

        let ff = page("FF", WindowKind::Frame { loaded: false });
        ensure_body_present(&ff, true, false);
        assert!(ff.get().document.body().is_some());
    }

    #[test]
    fn frames_are_fixed_by_top_level_page() {
        let frame = page("IE8", WindowKind::Frame { loaded: false });
        let top = page("IE8", WindowKind::TopLevel);
        top.get_mut().frames.push(frame.clone());

        ensure_body_present(&top, true, true);
        assert!(top.get().document.body().is_none());
        assert!(frame.get().document.body().is_some());
    }
}
