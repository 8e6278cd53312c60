//! Browser compatible tag soup HTML parser
//!
//! This crate bundles the parser crates. The parser itself lives in [`html`], the simulated
//! browsers and parser options in [`config`] and the shared types in [`shared`].

pub use tagsoup_config as config;
pub use tagsoup_html as html;
pub use tagsoup_shared as shared;

pub use tagsoup_html::page::{Page, PageHandle};
pub use tagsoup_html::parser::{parse_fragment, parse_fragment_into, parse_html, parse_html_str, HtmlParser};
