use thiserror::Error;

/// Errors that can occur during server initialization or execution.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Socket or filesystem error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tracing could not be installed.
    #[error("Tracing error: {0}")]
    TracingError(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
