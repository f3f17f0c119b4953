//! Terminal failures surfaced by the executor.

use std::io;

use super::retry::ENHANCE_YOUR_CLAIM;

/// The one failure type callers see once the retry budget is spent.
///
/// Status-bearing variants carry the body of the last response. A transport
/// failure carries the last I/O cause and has no status. A request that could
/// not be built is reported at once and has no status either.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Status below 500 (including 400 and 420). Never retried.
    #[error("HTTP {status}: {body}")]
    Client { status: u16, body: String },

    /// Status 500 or above on the final attempt.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// Connect, read or other I/O failure on the final attempt.
    #[error("{source}")]
    Transport {
        #[source]
        source: io::Error,
    },

    /// The request itself is unusable (bad URL, header or proxy). Never retried.
    #[error("invalid request: {source}")]
    InvalidRequest {
        #[source]
        source: io::Error,
    },
}

impl HttpError {
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        if status >= 500 {
            HttpError::Server { status, body }
        } else {
            HttpError::Client { status, body }
        }
    }

    /// Wraps a failed send. `InvalidInput` marks a request that never left
    /// the process.
    pub(crate) fn transport(source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::InvalidInput {
            HttpError::InvalidRequest { source }
        } else {
            HttpError::Transport { source }
        }
    }

    /// Whether another attempt could succeed where this one failed.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            HttpError::Server { .. } | HttpError::Transport { .. } => true,
            HttpError::Client { .. } | HttpError::InvalidRequest { .. } => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpError::Client { status, .. } | HttpError::Server { status, .. } => Some(*status),
            HttpError::Transport { .. } | HttpError::InvalidRequest { .. } => None,
        }
    }

    /// Status code with `-1` standing in for "no response".
    pub fn raw_status_code(&self) -> i32 {
        self.status_code().map_or(-1, i32::from)
    }

    /// Response body of the failing exchange, if there was one.
    pub fn body(&self) -> Option<&str> {
        match self {
            HttpError::Client { body, .. } | HttpError::Server { body, .. } => Some(body),
            HttpError::Transport { .. } | HttpError::InvalidRequest { .. } => None,
        }
    }

    pub fn is_caused_by_network_issue(&self) -> bool {
        matches!(self, HttpError::Transport { .. })
    }

    pub fn exceeded_rate_limitation(&self) -> bool {
        self.status_code() == Some(ENHANCE_YOUR_CLAIM)
    }
}
