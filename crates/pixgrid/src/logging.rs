#![forbid(unsafe_code)]

//! Subscriber setup for hosts that do not install their own.
//!
//! Every pixgrid crate logs through `tracing`. Libraries embedding pixgrid
//! usually already have a subscriber; standalone hosts and demos can call
//! [`init`] once at startup. `RUST_LOG` overrides the default level.

use serde::{Deserialize, Serialize};

/// Output format for [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per event.
    Json,
}

/// Install a global subscriber at `info` (or `RUST_LOG`).
///
/// Fails if a global subscriber is already set.
#[cfg(feature = "subscriber")]
pub fn init(format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    init_with_level(format, "info")
}

/// Install a global subscriber with an explicit default directive such as
/// `"pixgrid_loader=debug,info"`. `RUST_LOG` still wins when set.
#[cfg(feature = "subscriber")]
pub fn init_with_level(
    format: LogFormat,
    default_directive: &str,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Plain => registry
            .with(fmt::layer().with_target(true).with_thread_names(true))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_thread_names(true))
            .try_init()?,
    }

    tracing::debug!(?format, "logging initialized");
    Ok(())
}
