//! SDK error types

use eis_runtime::RuntimeError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Invalid experiment configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Layered configuration could not be read or deserialized
    #[error("Settings error: {0}")]
    SettingsError(#[from] config::ConfigError),

    /// YAML parse error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] RuntimeError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    TelemetryError(String),
}

impl SdkError {
    /// The runtime error behind this one, if any
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            SdkError::RuntimeError(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("lookback_days must be positive".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("lookback_days"));
    }

    #[test]
    fn test_runtime_error_conversion() {
        let sdk_error: SdkError = RuntimeError::UnknownFeature("shoe_size".to_string()).into();
        assert!(sdk_error.to_string().contains("Runtime error"));
        assert!(matches!(
            sdk_error.as_runtime(),
            Some(RuntimeError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "experiment.yaml");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.as_runtime().is_none());
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let sdk_error: SdkError = yaml_error.into();
        assert!(sdk_error.to_string().starts_with("YAML error"));
    }
}
