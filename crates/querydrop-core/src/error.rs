use thiserror::Error;

/// Problems found while extracting or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {key}")]
    Missing { key: &'static str },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Unrecognised output format '{0}' (use csv, pipe or pdf)")]
    UnknownFormat(String),

    #[error("Unrecognised delivery method '{0}' (use local or sftp)")]
    UnknownDelivery(String),

    #[error("Settings extraction failed: {0}")]
    Extract(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Run-level failure taxonomy. Every component error folds into exactly one
/// of these; any of them aborts the current run and nothing else.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl ExportError {
    /// Short stable code attached to the run-summary log line.
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::Configuration(_) => "CONFIG_ERROR",
            ExportError::Connection(_) => "CONNECTION_ERROR",
            ExportError::Query(_) => "QUERY_ERROR",
            ExportError::Format(_) => "FORMAT_ERROR",
            ExportError::Delivery(_) => "DELIVERY_ERROR",
        }
    }
}

impl From<ConfigError> for ExportError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::UnknownFormat(_) => ExportError::Format(e.to_string()),
            other => ExportError::Configuration(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_maps_to_format_error() {
        let e: ExportError = ConfigError::UnknownFormat("xml".to_string()).into();
        assert_eq!(e.code(), "FORMAT_ERROR");
        assert!(e.to_string().contains("xml"));
    }

    #[test]
    fn missing_setting_maps_to_configuration_error() {
        let e: ExportError = ConfigError::Missing { key: "sql_query" }.into();
        assert_eq!(e.code(), "CONFIG_ERROR");
    }
}
