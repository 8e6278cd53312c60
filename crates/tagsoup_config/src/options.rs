use serde::Deserialize;

/// Page level switches that are not tied to a browser identity
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserOptions {
    /// The page is XML flavoured (XHTML). Self-closing tags are honored and the XHTML
    /// namespace is kept on elements.
    pub xhtml: bool,
    /// When scripting is enabled, `noscript` content is raw text and elements get a behavior
    /// object that event handlers can be registered on.
    pub javascript_enabled: bool,
    /// Forward diagnostics to the page's listener
    pub report_errors: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            xhtml: false,
            javascript_enabled: true,
            report_errors: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options: ParserOptions = serde_json::from_str(r#"{ "xhtml": true }"#).unwrap();
        assert!(options.xhtml);
        assert!(options.javascript_enabled);
        assert!(options.report_errors);
    }
}
