use aws_smithy_runtime_api::client::result::CreateUnhandledError;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::http::Response;
use thiserror::Error;

pub mod config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Input closed before '{0}' was answered")]
    InputClosed(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures the operator caused by answering a prompt badly.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// A single answer that failed its field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{message}")]
    Blank { message: String },

    #[error("Value '{value}' is not a valid integer")]
    NotInteger { value: String },

    #[error("Value '{value}' must be a positive integer")]
    NotPositive { value: String },

    #[error("Value '{value}' is not one of the valid options ({})", .allowed.join(", "))]
    NotAllowed { value: String, allowed: Vec<String> },

    #[error("Value '{value}' is not a valid regular expression: {reason}")]
    InvalidPattern { value: String, reason: String },
}

// Implement From for various SdkError types
impl<E: std::fmt::Debug + CreateUnhandledError> From<SdkError<E, Response>> for Error {
    fn from(err: SdkError<E, Response>) -> Self {
        Error::AwsSdk(format!("{:?}", err))
    }
}
