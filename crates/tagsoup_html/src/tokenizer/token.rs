use tagsoup_shared::byte_stream::Location;

/// The different token structures that can be emitted by the scanner
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    DocType {
        name: String,
        pub_identifier: Option<String>,
        sys_identifier: Option<String>,
        location: Location,
    },
    StartTag {
        name: String,
        /// Attributes in source order. Duplicates are already removed (first one wins).
        attributes: Vec<(String, String)>,
        /// True when the tag was self-closing and the scanner decided to honor that
        is_self_closing: bool,
        location: Location,
    },
    EndTag {
        name: String,
        location: Location,
    },
    Comment {
        comment: String,
        location: Location,
    },
    Text {
        text: String,
        location: Location,
    },
    Eof {
        location: Location,
    },
}

impl Token {
    pub fn get_location(&self) -> Location {
        match self {
            Token::DocType { location, .. }
            | Token::StartTag { location, .. }
            | Token::EndTag { location, .. }
            | Token::Comment { location, .. }
            | Token::Text { location, .. }
            | Token::Eof { location } => location.clone(),
        }
    }

    /// Returns true when the token is an EOF token
    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof { .. })
    }

    /// Returns true if the text token is empty or only contains whitespace
    pub fn is_empty_or_white(&self) -> bool {
        match self {
            Token::Text { text, .. } => text.chars().all(char::is_whitespace),
            _ => false,
        }
    }
}
