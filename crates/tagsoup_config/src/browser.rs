use crate::errors::Error;
use crate::features::BrowserFeature;
use log::warn;
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;

/// A simulated browser identity. The parser only cares about the numeric version (for
/// conditional comments and document modes), whether it is an IE flavour, and its quirk switches.
#[derive(Clone, Debug, PartialEq)]
pub struct BrowserVersion {
    /// Short name as used in the registry (ie: "IE8")
    pub name: String,
    /// Human readable name
    pub nickname: String,
    /// Numeric version (ie: 8.0)
    pub version: f32,
    /// True for Internet Explorer flavours
    pub is_ie: bool,
    features: HashSet<BrowserFeature>,
}

impl BrowserVersion {
    pub fn new(name: &str, nickname: &str, version: f32, is_ie: bool) -> Self {
        Self {
            name: name.to_string(),
            nickname: nickname.to_string(),
            version,
            is_ie,
            features: HashSet::new(),
        }
    }

    /// Returns true when the given quirk switch is enabled
    pub fn has_feature(&self, feature: BrowserFeature) -> bool {
        self.features.contains(&feature)
    }

    /// Returns a copy of this browser with the given feature enabled
    #[must_use]
    pub fn with_feature(mut self, feature: BrowserFeature) -> Self {
        self.features.insert(feature);
        self
    }

    /// Returns a copy of this browser with the given feature disabled
    #[must_use]
    pub fn without_feature(mut self, feature: BrowserFeature) -> Self {
        self.features.remove(&feature);
        self
    }

    /// Integer part of the version
    pub fn major_version(&self) -> u32 {
        self.version.trunc() as u32
    }
}

/// `JsonBrowser` is used for parsing the browsers.json file
#[derive(Debug, Deserialize)]
struct JsonBrowser {
    name: String,
    nickname: String,
    version: f32,
    ie: bool,
    features: Vec<String>,
}

/// `JsonRegistry` is the top level of the browsers.json file
#[derive(Debug, Deserialize)]
struct JsonRegistry {
    inline_whitespace_tags: Vec<String>,
    browsers: Vec<JsonBrowser>,
}

/// Immutable set of known browser identities and shared parser data
#[derive(Debug, Default)]
pub struct BrowserRegistry {
    browsers: Vec<BrowserVersion>,
    inline_whitespace_tags: HashSet<String>,
}

impl BrowserRegistry {
    /// Parses a registry from its json representation. Unknown feature names are skipped with a
    /// warning so an older binary can still read a newer file.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let data: JsonRegistry = serde_json::from_str(json)?;

        let mut browsers = Vec::with_capacity(data.browsers.len());
        for entry in data.browsers {
            let mut browser = BrowserVersion::new(&entry.name, &entry.nickname, entry.version, entry.ie);
            for name in &entry.features {
                match BrowserFeature::from_str(name) {
                    Ok(feature) => browser = browser.with_feature(feature),
                    Err(err) => warn!("browser {}: {err}", entry.name),
                }
            }
            browsers.push(browser);
        }

        if browsers.is_empty() {
            return Err(Error::Config("registry does not define any browser".into()));
        }

        Ok(Self {
            browsers,
            inline_whitespace_tags: data.inline_whitespace_tags.into_iter().collect(),
        })
    }

    /// Finds a browser by its (case-insensitive) name
    pub fn get(&self, name: &str) -> Option<&BrowserVersion> {
        self.browsers
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// All browsers in the registry, in the order they are defined
    pub fn browsers(&self) -> &[BrowserVersion] {
        &self.browsers
    }

    /// Inline tags after which whitespace-only text is insignificant
    pub fn inline_whitespace_tags(&self) -> &HashSet<String> {
        &self.inline_whitespace_tags
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const JSON: &str = r#"{
        "inline_whitespace_tags": ["span", "b"],
        "browsers": [
            { "name": "TEST", "nickname": "Test browser", "version": 5.5, "ie": true,
              "features": ["SVG", "NOT_A_FEATURE"] }
        ]
    }"#;

    #[test]
    fn parse_registry() {
        let registry = BrowserRegistry::from_json(JSON).unwrap();
        let browser = registry.get("test").unwrap();

        assert_eq!(browser.nickname, "Test browser");
        assert_eq!(browser.major_version(), 5);
        assert!(browser.is_ie);
        assert!(browser.has_feature(BrowserFeature::Svg));
        assert!(!browser.has_feature(BrowserFeature::DoctypeIsComment));
        assert!(registry.inline_whitespace_tags().contains("span"));
    }

    #[test]
    fn unknown_features_are_logged() {
        testing_logger::setup();

        let _ = BrowserRegistry::from_json(JSON).unwrap();

        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 1);
            assert_eq!(captured_logs[0].level, log::Level::Warn);
            assert!(captured_logs[0].body.contains("NOT_A_FEATURE"));
        });
    }

    #[test]
    fn empty_registry_is_an_error() {
        let result = BrowserRegistry::from_json(r#"{"inline_whitespace_tags": [], "browsers": []}"#);
        assert!(result.is_err());
        assert!(BrowserRegistry::from_json("{").is_err());
    }

    #[test]
    fn toggling_features() {
        let browser = BrowserVersion::new("X", "X", 1.0, false)
            .with_feature(BrowserFeature::Svg)
            .with_feature(BrowserFeature::JsDefineGetter)
            .without_feature(BrowserFeature::Svg);

        assert!(!browser.has_feature(BrowserFeature::Svg));
        assert!(browser.has_feature(BrowserFeature::JsDefineGetter));
    }
}
