use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while talking to a single Invidious instance
///
/// None of these are fatal for a whole run; callers turn them into a log line
/// or a failed [`crate::inspector::StreamQueryResult`] and move on to the next instance.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Connection error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status}")]
    Http { status: StatusCode },

    /// The body could not be read as the expected JSON. `status` is set when the instance did answer.
    #[error("Unexpected response: {message}")]
    Decode {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("No matching {0} found")]
    NotFound(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ProbeError {
    /// HTTP status carried by the error, if the instance answered at all
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status } => Some(*status),
            Self::Decode { status, .. } => *status,
            _ => None,
        }
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            status: None,
            message: message.into(),
        }
    }

    /// Records the status of the response whose body failed to decode
    #[must_use]
    pub fn with_status(self, received: StatusCode) -> Self {
        match self {
            Self::Decode { message, .. } => Self::Decode {
                status: Some(received),
                message,
            },
            other => other,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Timeout;
        }
        if e.is_decode() {
            return Self::decode(e.to_string());
        }
        if let Some(status) = e.status() {
            return Self::Http { status };
        }
        Self::Network(e)
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(e: serde_json::Error) -> Self {
        Self::decode(e.to_string())
    }
}
