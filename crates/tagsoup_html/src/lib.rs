//! HTML parser that builds the same document tree a (legacy) browser would build
//!
//! Real world markup is rarely well formed. Tables contain stray forms and text, bodies are
//! opened twice, heads are missing and `</form>` tags show up in the wrong places. This crate
//! parses such tag soup into a document tree the way a simulated browser does, including the
//! quirks of that browser (conditional comments, doctypes as comments, whitespace handling).
//!
//! ```
//! use tagsoup_html::page::{Page, PageHandle};
//! use tagsoup_html::parser::parse_html_str;
//!
//! let url = url::Url::parse("http://localhost/").unwrap();
//! let page = PageHandle::create(Page::new(url, tagsoup_config::default_browser()));
//! parse_html_str(&page, "<table><tr><td>cell</table>").unwrap();
//! assert_eq!(page.get().document.elements_by_tag("tbody").len(), 1);
//! ```

pub mod conditional_comment;
pub mod document;
pub mod element_factory;
pub mod errors;
pub mod node;
pub mod page;
pub mod parser;
pub mod script;
pub mod tokenizer;
