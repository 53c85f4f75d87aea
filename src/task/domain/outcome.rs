//! Remote call results and their classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status codes treated as success by every remote system.
const SUCCESS_STATUSES: [u16; 9] = [200, 201, 202, 204, 301, 302, 303, 304, 307];

/// A response received from a remote system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse<T> {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase or error text from the server.
    pub reason: String,
    /// Parsed body, when the call returns data and parsing succeeded.
    pub payload: Option<T>,
}

impl<T> RemoteResponse<T> {
    /// Creates a response with a parsed payload.
    #[must_use]
    pub fn with_payload(status: u16, payload: T) -> Self {
        Self {
            status,
            reason: String::new(),
            payload: Some(payload),
        }
    }

    /// Creates a response without a payload.
    #[must_use]
    pub fn status_only(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            payload: None,
        }
    }

    /// Returns the outcome category for this response.
    #[must_use]
    pub fn outcome(&self) -> OutcomeCategory {
        OutcomeCategory::classify(self.status)
    }
}

/// Transport-level failure reaching a remote system.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("connection failed: {0}")]
pub struct ConnectionFailed(pub String);

/// Result of a remote call: a response of any status, or no response.
pub type RemoteResult<T> = Result<RemoteResponse<T>, ConnectionFailed>;

/// Category a remote call outcome falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    /// 2xx or redirect status.
    Success,
    /// 401 or 403.
    Forbidden,
    /// 404.
    NotFound,
    /// Any other status.
    Unknown,
    /// No response at all.
    ConnectionFailed,
}

impl OutcomeCategory {
    /// Classifies a response status code.
    #[must_use]
    pub fn classify(status: u16) -> Self {
        match status {
            code if SUCCESS_STATUSES.contains(&code) => Self::Success,
            401 | 403 => Self::Forbidden,
            404 => Self::NotFound,
            _ => Self::Unknown,
        }
    }

    /// Returns `true` for [`Self::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}
