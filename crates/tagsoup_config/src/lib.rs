//! Simulated browser identities
//!
//! The parser emulates the tree construction quirks of a handful of (legacy) browsers. Which
//! quirks apply is decided by a set of boolean [`BrowserFeature`] switches carried by a
//! [`BrowserVersion`]. The known browsers are defined in `browsers.json`, which is compiled
//! into the binary and loaded once into an immutable registry.

pub mod browser;
pub mod errors;
pub mod features;
pub mod options;

pub use crate::browser::{BrowserRegistry, BrowserVersion};
pub use crate::features::BrowserFeature;
pub use crate::options::ParserOptions;

use lazy_static::lazy_static;
use log::error;
use std::collections::HashSet;

/// Browsers are stored in a json file, but this is included in the binary for easy editing.
const BROWSERS_JSON: &str = include_str!("./browsers.json");

/// Name of the browser used when none is given
pub const DEFAULT_BROWSER: &str = "FF";

lazy_static! {
    static ref REGISTRY: BrowserRegistry = match BrowserRegistry::from_json(BROWSERS_JSON) {
        Ok(registry) => registry,
        Err(err) => {
            error!("config: cannot load browsers.json: {err}");
            BrowserRegistry::default()
        }
    };
}

/// Returns the process-wide browser registry
pub fn registry() -> &'static BrowserRegistry {
    &REGISTRY
}

/// Returns the browser with the given name (IE8, IE9, IE11, FF, CHROME)
pub fn browser(name: &str) -> Option<&'static BrowserVersion> {
    REGISTRY.get(name)
}

/// Returns a copy of the default browser. Falls back to a featureless identity when the
/// registry could not be loaded.
pub fn default_browser() -> BrowserVersion {
    match REGISTRY.get(DEFAULT_BROWSER) {
        Some(browser) => browser.clone(),
        None => BrowserVersion::new(DEFAULT_BROWSER, "Generic", 1.0, false),
    }
}

/// Inline tags after which whitespace-only text is visually insignificant
pub fn inline_whitespace_tags() -> &'static HashSet<String> {
    REGISTRY.inline_whitespace_tags()
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("IE8", 8, true)]
    #[test_case("ie9", 9, true)]
    #[test_case("IE11", 11, true)]
    #[test_case("FF", 31, false)]
    #[test_case("CHROME", 36, false)]
    fn embedded_browsers(name: &str, major: u32, is_ie: bool) {
        let browser = browser(name).unwrap();
        assert_eq!(browser.major_version(), major);
        assert_eq!(browser.is_ie, is_ie);
    }

    #[test]
    fn embedded_features() {
        let ie8 = browser("IE8").unwrap();
        assert!(ie8.has_feature(BrowserFeature::HtmlConditionalComments));
        assert!(ie8.has_feature(BrowserFeature::DoctypeIsComment));
        assert!(!ie8.has_feature(BrowserFeature::JsDefineGetter));

        let ff = default_browser();
        assert_eq!(ff.name, "FF");
        assert!(!ff.has_feature(BrowserFeature::HtmlConditionalComments));
        assert!(ff.has_feature(BrowserFeature::Svg));
    }

    #[test]
    fn unknown_browser() {
        assert!(browser("NETSCAPE4").is_none());
    }

    #[test]
    fn whitespace_tags() {
        let tags = inline_whitespace_tags();
        for tag in ["a", "span", "font", "em", "strong"] {
            assert!(tags.contains(tag), "{tag} should be whitespace insignificant");
        }
        assert!(!tags.contains("div"));
    }
}
