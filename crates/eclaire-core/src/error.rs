//! Error types for Eclaire

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range snapshot/request. Never partially processed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rule table error: {0}")]
    Config(String),

    #[error("Invalid rule table TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Stable machine-readable kind, used by the API error body
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config",
            Error::Toml(_) => "config",
        }
    }

    /// True when the caller sent something the engine refuses to analyze
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
