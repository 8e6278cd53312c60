#[derive(Debug, Clone, PartialEq)]
/// Data structure for document type nodes
pub struct DocTypeData {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

impl DocTypeData {
    pub(crate) fn new(name: &str, public_id: &str, system_id: &str) -> Self {
        Self {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }
    }

    /// Text used when the doctype has to be represented as a comment node
    pub fn as_comment_text(&self) -> String {
        format!(
            "DOCTYPE {} PUBLIC \"{}\"      \"{}\"",
            self.name, self.public_id, self.system_id
        )
    }
}
