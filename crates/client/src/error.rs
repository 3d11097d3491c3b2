use models::forms::ValidationErrors;
use thiserror::Error;

/// Errors surfaced by the registrar client.
///
/// Cloneable so that a single coalesced request can hand the same outcome
/// to every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    /// The request never produced a response (connection, timeout, ...)
    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("not logged in")]
    Unauthenticated,

    /// An action was invoked on a resource missing one of its ids
    #[error("no {0} id given")]
    MissingId(&'static str),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether this is a request-level failure the user should be told about
    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Transport(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for a notification body
    pub fn user_message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Request {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
