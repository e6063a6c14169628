//! Error types for the BucketGuard core.

/// Core error type for gateway infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A configuration value could not be interpreted.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
