use thiserror::Error;

/// Failures loading an [`ExtractionConfig`](crate::config::ExtractionConfig).
///
/// Structuring itself never fails; only configuration can be rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
