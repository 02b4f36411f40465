use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskApiError {
    /// The request was rejected locally before anything was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request never reached the server (connection refused, timeout,
    /// broken body stream).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-success status. The message is the
    /// `error` field of the response body when there is one.
    #[error("{1}")]
    Http(reqwest::StatusCode, String),
    /// A success response whose body is not valid JSON or does not have the
    /// expected shape.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl RiskApiError {
    /// The HTTP status of the failure, if the server responded at all.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http(status, _) => Some(*status),
            Self::Network(error) => error.status(),
            Self::InvalidInput(_) | Self::Protocol(_) => None,
        }
    }
}

pub type RiskApiResult<T> = Result<T, RiskApiError>;
