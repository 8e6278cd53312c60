#[derive(Debug, Clone, PartialEq)]
/// Data structure for comment nodes
pub struct CommentData {
    /// The actual comment value
    pub value: String,
}

impl CommentData {
    pub(crate) fn with_value(value: &str) -> Self {
        Self {
            value: value.to_owned(),
        }
    }
}
