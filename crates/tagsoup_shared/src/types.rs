//! Error results that can be returned from the parser

use crate::byte_stream::Location;
use std::error::Error as StdError;
use thiserror::Error;

/// Severity of a reported parse problem
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Parser error that defines an error (message) on the given position
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    /// Parse error message
    pub message: String,
    /// Diagnostic key (ie: "misplaced-table-content")
    pub key: String,
    pub severity: Severity,
    /// Location of the error
    pub location: Location,
}

/// Serious errors and errors from third-party libraries
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("failed parsing content from {url}")]
    Parse {
        url: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

/// Result that can be returned which holds either T or an Error
pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn parse_error_keeps_the_transport_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset");
        let err = anyhow::Error::from(Error::Parse {
            url: "http://example.com".into(),
            source: Box::new(Error::IO(io_err)),
        });

        assert_eq!(err.to_string(), "failed parsing content from http://example.com");
        assert_eq!(err.chain().count(), 3);
        assert_eq!(err.root_cause().to_string(), "connection reset");
    }
}
