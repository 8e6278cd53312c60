#[derive(Debug, Clone, PartialEq)]
/// Data structure for text nodes
pub struct TextData {
    /// Actual text
    pub value: String,
}

impl TextData {
    pub(crate) fn with_value(value: &str) -> Self {
        Self {
            value: value.to_owned(),
        }
    }
}
