//! Error results that can be returned from the html parser
use thiserror::Error;

/// Errors in how the parser was called. Problems in the markup itself are never errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid fragment target: {0}")]
    FragmentTarget(String),
}
