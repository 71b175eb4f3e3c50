#![forbid(unsafe_code)]

//! Loader errors.
//!
//! Failures stay inside the loader: the index and controller never see them.
//! Each error knows whether another attempt may succeed and what short
//! notice to show the user.

use thiserror::Error;
use web_time::Duration;

/// A failed fetch, reload, or change decode.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cell source failed: {message}")]
    Source { message: String, retryable: bool },
    #[error("grid reload timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("grid reload cancelled")]
    Cancelled,
    #[error("failed to decode change payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("change feed disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, LoadError>;

impl LoadError {
    /// A source failure that another attempt may fix (network blip, 5xx).
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            retryable: true,
        }
    }

    /// A source failure that retrying will not fix (bad query, auth).
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            retryable: false,
        }
    }

    /// Whether the retry policy should try again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Source { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            Self::Cancelled | Self::Decode(_) | Self::Disconnected => false,
        }
    }

    /// Short user-facing notice.
    #[must_use]
    pub fn advisory(&self) -> &'static str {
        match self {
            Self::Source { .. } => "Could not load the grid. Showing the last known state.",
            Self::Timeout { .. } => "Loading the grid is taking too long. Please try refreshing.",
            Self::Cancelled => "Grid loading was cancelled.",
            Self::Decode(_) => "Received an update the grid could not read.",
            Self::Disconnected => "Live updates paused. Refresh to reconnect.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability() {
        assert!(LoadError::transient("503").is_retryable());
        assert!(!LoadError::permanent("401").is_retryable());
        assert!(
            LoadError::Timeout {
                after: Duration::from_secs(30)
            }
            .is_retryable()
        );
        assert!(!LoadError::Cancelled.is_retryable());
        assert!(!LoadError::Disconnected.is_retryable());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            LoadError::transient("connection reset").to_string(),
            "cell source failed: connection reset"
        );
        assert_eq!(
            LoadError::Timeout {
                after: Duration::from_millis(250)
            }
            .to_string(),
            "grid reload timed out after 250ms"
        );
    }

    #[test]
    fn decode_converts_from_serde() {
        let err: LoadError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, LoadError::Decode(_)));
        assert!(!err.advisory().is_empty());
    }
}
