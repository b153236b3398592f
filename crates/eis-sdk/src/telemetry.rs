//! Tracing subscriber setup

use crate::error::{Result, SdkError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "eis_sdk=info,eis_runtime=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`, or by
/// `default_filter` when the variable is unset or invalid.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| SdkError::TelemetryError(format!("Failed to initialize tracing: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_an_error() {
        // The first call may race with other tests; only the second must fail
        let _ = init_tracing(DEFAULT_LOG_FILTER);
        let err = init_tracing(DEFAULT_LOG_FILTER).unwrap_err();
        assert!(matches!(err, SdkError::TelemetryError(_)));
    }
}
