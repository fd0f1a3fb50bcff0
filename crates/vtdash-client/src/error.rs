//! Normalized fetch failures.
//!
//! Transport-agnostic errors that hide reqwest details; the loader that
//! receives one renders its `Display` text to the operator.

/// Failure of a single API fetch. No retry state is attached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("network error: {message}")]
    Network { message: String },

    /// The API answered with a status outside 2xx.
    #[error("HTTP {status}: {status_text}")]
    HttpStatus { status: u16, status_text: String },

    /// The body was not the JSON shape the caller asked for.
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            status_text: status_text.into(),
        }
    }

    /// HTTP status code, when the server answered at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Network { .. } | Self::Decode { .. } => None,
        }
    }

    /// Human-readable message shown inside error fragments.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}
