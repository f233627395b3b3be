use thiserror::Error;

/// Main error type for the classifier and its service
#[derive(Error, Debug)]
pub enum IrisError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Model artifact errors
    #[error("Model error: {0}")]
    Model(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for IrisError
pub type Result<T> = std::result::Result<T, IrisError>;
