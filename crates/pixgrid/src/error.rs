#![forbid(unsafe_code)]

//! Top-level error and recovery model.
//!
//! Loader and configuration failures surface here. Interaction and index
//! operations never fail; they degrade to empty results instead. Each
//! [`Error`] maps to a [`Recovery`] the embedding app acts on so the grid
//! stays usable.

use std::fmt;

use pixgrid_loader::LoadError;

use crate::config::ConfigError;

/// Top-level error for pixgrid hosts.
#[derive(Debug)]
pub enum Error {
    /// Reload, fetch, or change-feed failure.
    Load(LoadError),
    /// Configuration could not be read or is invalid.
    Config(ConfigError),
}

/// Standard result type for pixgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What the host should do after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Schedule another reload later; keep rendering the current index.
    RetryLater,
    /// Keep rendering the current index and tell the user it may be stale.
    KeepStaleIndex,
    /// Drop the offending change event and keep consuming the feed.
    DropEvent,
    /// Nothing to recover; the operation was abandoned on purpose.
    Abandoned,
    /// Startup cannot continue.
    Abort,
}

impl Error {
    /// Recovery action for this error.
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Load(err) if err.is_retryable() => Recovery::RetryLater,
            Self::Load(LoadError::Decode(_)) => Recovery::DropEvent,
            Self::Load(LoadError::Cancelled) => Recovery::Abandoned,
            Self::Load(_) => Recovery::KeepStaleIndex,
            Self::Config(_) => Recovery::Abort,
        }
    }

    /// Error type label for tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Config(_) => "config",
        }
    }

    /// Short user-facing notice.
    #[must_use]
    pub fn advisory(&self) -> &'static str {
        match self {
            Self::Load(err) => err.advisory(),
            Self::Config(_) => "The grid could not start because its settings are invalid.",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "load error: {err}"),
            Self::Config(err) => write!(f, "config error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use web_time::Duration;

    #[test]
    fn recovery_mapping() {
        let cases = [
            (Error::from(LoadError::transient("503")), Recovery::RetryLater),
            (
                Error::from(LoadError::Timeout {
                    after: Duration::from_secs(30),
                }),
                Recovery::RetryLater,
            ),
            (Error::from(LoadError::permanent("401")), Recovery::KeepStaleIndex),
            (Error::from(LoadError::Disconnected), Recovery::KeepStaleIndex),
            (Error::from(LoadError::Cancelled), Recovery::Abandoned),
            (
                Error::from(ConfigError::Invalid(vec!["x".into()])),
                Recovery::Abort,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.recovery(), expected, "{err}");
        }

        let decode: Error = LoadError::from(serde_json::from_str::<u8>("?").unwrap_err()).into();
        assert_eq!(decode.recovery(), Recovery::DropEvent);
        assert_eq!(decode.error_type(), "load");
    }

    #[test]
    fn display_and_source() {
        let err = Error::from(ConfigError::Invalid(vec![
            "grid.width and grid.height must be > 0, got 0x1".into(),
            "loader.page_size must be > 0".into(),
        ]));
        assert_eq!(
            err.to_string(),
            "config error: invalid configuration: grid.width and grid.height must be > 0, got 0x1; loader.page_size must be > 0"
        );
        assert!(err.source().is_some());
        assert_eq!(err.error_type(), "config");

        let err = Error::from(LoadError::Cancelled);
        assert_eq!(err.to_string(), "load error: grid reload cancelled");
        assert_eq!(err.advisory(), "Grid loading was cancelled.");
    }
}
