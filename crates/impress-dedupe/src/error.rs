//! Error types for impress-dedupe

use thiserror::Error;

/// Result type alias for deduplication operations
pub type Result<T> = std::result::Result<T, DedupeError>;

/// Main error type for deduplication operations
///
/// Everything except `EmptyCluster` is a configuration error raised while a
/// pipeline is being built, never while it runs.
#[derive(Error, Debug)]
pub enum DedupeError {
    /// Fuzzy threshold outside 0-100
    #[error("Invalid threshold {threshold} for field '{field}': must be between 0 and 100")]
    InvalidThreshold { field: String, threshold: f64 },

    /// Exact matcher configured without any field
    #[error("Exact matcher requires at least one field")]
    EmptyFieldList,

    /// Blank field name in a module config
    #[error("Field name must not be empty")]
    EmptyFieldName,

    /// Field outside the declared record schema
    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    /// No pipeline registered under the name
    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),

    /// Primary selection on a cluster with no records
    #[error("Cannot select a primary record from an empty cluster")]
    EmptyCluster,

    /// TOML config parse error
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// JSON config parse error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while loading configs
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for DedupeError {
    fn from(err: toml::de::Error) -> Self {
        DedupeError::ConfigParse(err.to_string())
    }
}

impl DedupeError {
    /// Whether this error comes from an invalid pipeline configuration
    pub fn is_config_error(&self) -> bool {
        !matches!(self, DedupeError::EmptyCluster | DedupeError::Io(_))
    }
}
