use thiserror::Error;

use crate::assertion::AssertError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file is not valid TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Missing setting: {0}")]
    MissingSetting(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Assertion failed: {0}")]
    Assertion(#[from] AssertError),

    #[error("No request has been prepared in this scenario")]
    NoPendingRequest,

    #[error("No response has been captured in this scenario")]
    NoResponse,

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for HarnessError {
    fn from(err: anyhow::Error) -> Self {
        HarnessError::Other(err.to_string())
    }
}

impl HarnessError {
    /// Whether this error is a reported assertion failure rather than an execution problem.
    pub fn is_assertion(&self) -> bool {
        matches!(self, HarnessError::Assertion(_))
    }
}

/// Result type for the apicheck crate
pub type Result<T> = std::result::Result<T, HarnessError>;
