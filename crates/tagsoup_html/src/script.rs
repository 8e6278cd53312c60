//! Hooks for an embedding script engine
//!
//! The parser does not execute scripts itself. An embedder that has a script engine can hand a
//! [`ScriptHost`] to the parser; every `<script>` element is then executed as soon as it is
//! complete. While a script runs it can write markup back into the page through the
//! [`ScriptContext`], which parses it at the current insertion point before the outer parse
//! continues.

use crate::page::PageHandle;

/// Array prototype methods that are not available in legacy quirks mode
pub const LEGACY_ARRAY_METHODS: &[&str] = &[
    "every",
    "filter",
    "forEach",
    "indexOf",
    "lastIndexOf",
    "map",
    "reduce",
    "reduceRight",
    "some",
];

/// A script engine driven by the parser
pub trait ScriptHost {
    /// Executes the source of a completed script element
    fn execute(&mut self, script: &str, context: &mut dyn ScriptContext);

    /// Removes the given properties from the prototype of a built-in class
    fn remove_prototype_properties(&mut self, _class: &str, _properties: &[&str]) {}
}

/// What a running script can do with the page that is being parsed
pub trait ScriptContext {
    /// Parses the markup at the current insertion point (`document.write`)
    fn write(&mut self, markup: &str);

    /// The page being parsed
    fn page(&self) -> PageHandle;
}

/// Returns true when the `type` or `language` attribute of a script element names javascript
/// (or is absent)
pub fn is_javascript(script_type: Option<&str>, language: Option<&str>) -> bool {
    if let Some(script_type) = script_type.map(str::trim).filter(|t| !t.is_empty()) {
        let script_type = script_type.to_ascii_lowercase();
        return matches!(
            script_type.as_str(),
            "text/javascript"
                | "application/javascript"
                | "application/x-javascript"
                | "text/ecmascript"
                | "application/ecmascript"
                | "text/jscript"
        );
    }

    match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => language.to_ascii_lowercase().starts_with("javascript"),
        None => true,
    }
}
