//! Error results that can be returned from the configuration crate
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("json parsing error: {0}")]
    JsonSerde(#[from] serde_json::Error),
}
