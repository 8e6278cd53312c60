use crate::parser::listener::HtmlParserListener;
use std::rc::Rc;
use tagsoup_shared::byte_stream::Location;
use tagsoup_shared::types::{ParseError, Severity};

/// Problems found in the markup. None of them aborts a parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserError {
    EofInComment,
    EofInTag,
    EofInDoctype,
    InvalidConditionalComment,
    MisplacedTableContent,
    MisplacedText,
    OrphanFormField,
    DuplicateElement,
    UnmatchedEndTag,
    MissingHead,
    MissingBody,
}

impl ParserError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserError::EofInComment => "eof-in-comment",
            ParserError::EofInTag => "eof-in-tag",
            ParserError::EofInDoctype => "eof-in-doctype",
            ParserError::InvalidConditionalComment => "invalid-conditional-comment",
            ParserError::MisplacedTableContent => "misplaced-table-content",
            ParserError::MisplacedText => "misplaced-text",
            ParserError::OrphanFormField => "orphan-form-field",
            ParserError::DuplicateElement => "duplicate-element",
            ParserError::UnmatchedEndTag => "unmatched-end-tag",
            ParserError::MissingHead => "missing-head",
            ParserError::MissingBody => "missing-body",
        }
    }

    /// Tokenizer problems are errors, tree repairs are warnings
    pub fn severity(&self) -> Severity {
        match self {
            ParserError::EofInComment | ParserError::EofInTag | ParserError::EofInDoctype => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }
}

/// Collects the problems found during a parse. The scanner and the tree builder share one
/// logger, so every problem ends up in a single list in document order.
#[derive(Default)]
pub struct ErrorLogger {
    /// List of errors that occurred during parsing
    errors: Vec<ParseError>,
    listener: Option<Rc<dyn HtmlParserListener>>,
    url: String,
    html: Option<String>,
}

impl ErrorLogger {
    /// Creates a new error logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger that also forwards every new problem to the given listener
    pub fn with_listener(
        listener: Rc<dyn HtmlParserListener>,
        url: &str,
        html: Option<String>,
    ) -> Self {
        Self {
            errors: Vec::new(),
            listener: Some(listener),
            url: url.to_string(),
            html,
        }
    }

    /// Returns a cloned instance of the errors
    pub fn get_errors(&self) -> Vec<ParseError> {
        self.errors.clone()
    }

    /// Adds a new error to the error logger. The same message on the same position is only
    /// recorded once.
    pub fn add_error(&mut self, location: Location, kind: ParserError, message: &str) {
        if self
            .errors
            .iter()
            .any(|err| err.location == location && err.message == message)
        {
            return;
        }

        if let Some(listener) = &self.listener {
            let html = self.html.as_deref();
            match kind.severity() {
                Severity::Error => listener.error(
                    message,
                    &self.url,
                    html,
                    location.line,
                    location.column,
                    kind.as_str(),
                ),
                Severity::Warning => listener.warning(
                    message,
                    &self.url,
                    html,
                    location.line,
                    location.column,
                    kind.as_str(),
                ),
            }
        }

        self.errors.push(ParseError {
            message: message.to_string(),
            key: kind.as_str().to_string(),
            severity: kind.severity(),
            location,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl HtmlParserListener for Recorder {
        fn error(&self, message: &str, url: &str, _: Option<&str>, line: usize, col: usize, key: &str) {
            self.seen.borrow_mut().push(format!("E {url} {line}:{col} {key} {message}"));
        }

        fn warning(&self, message: &str, url: &str, _: Option<&str>, line: usize, col: usize, key: &str) {
            self.seen.borrow_mut().push(format!("W {url} {line}:{col} {key} {message}"));
        }
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut logger = ErrorLogger::new();
        logger.add_error(Location::new(1, 5, 4), ParserError::EofInTag, "eof in tag");
        logger.add_error(Location::new(1, 5, 4), ParserError::EofInTag, "eof in tag");
        logger.add_error(Location::new(2, 1, 9), ParserError::EofInTag, "eof in tag");

        let errors = logger.get_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].key, "eof-in-tag");
        assert_eq!(errors[0].severity, Severity::Error);
    }

    #[test]
    fn forwards_to_listener() {
        let recorder = Rc::new(Recorder::default());
        let mut logger = ErrorLogger::with_listener(recorder.clone(), "http://x/", None);
        logger.add_error(
            Location::new(3, 2, 20),
            ParserError::MisplacedText,
            "text moved before table",
        );

        assert_eq!(
            recorder.seen.borrow().as_slice(),
            &["W http://x/ 3:2 misplaced-text text moved before table".to_string()]
        );
    }
}
