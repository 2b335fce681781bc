use std::time::Duration;
use thiserror::Error;

/// Errors raised by page objects, the driver layer and the suite runner
#[derive(Debug, Error)]
pub enum Error {
    /// The browser driver rejected or failed a command
    #[error("driver error: {0}")]
    Driver(String),

    /// An interaction or wait did not complete within its bound
    #[error("timed out after {}ms waiting for {what}", .after.as_millis())]
    Timeout { what: String, after: Duration },

    /// No element matched the selector
    #[error("no element matches {0}")]
    NotFound(String),

    /// A scenario expectation did not hold
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Search criteria outside their valid range
    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),

    /// Configuration could not be used
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Build a timeout error for the given operation
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        Error::Timeout {
            what: what.into(),
            after,
        }
    }
}

impl From<fantoccini::error::CmdError> for Error {
    fn from(error: fantoccini::error::CmdError) -> Self {
        if error.is_no_such_element() {
            Error::NotFound(error.to_string())
        } else {
            Error::Driver(error.to_string())
        }
    }
}

impl From<fantoccini::error::NewSessionError> for Error {
    fn from(error: fantoccini::error::NewSessionError) -> Self {
        Error::Driver(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
