use sharefeed_conductor::ConductorError;
use sharefeed_types::TypeError;

/// Errors from share store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record is missing a required field.
    #[error("invalid share: {0}")]
    Validation(#[from] TypeError),

    /// I/O error from the local persistence layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted or remote data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The remote conductor could not be reached on any path.
    #[error("remote backend not connected: {reason}")]
    NotConnected { reason: String },

    /// Connected, but the remote function itself failed.
    #[error("remote function {function} failed: {message}")]
    RemoteCall { function: String, message: String },

    /// The backend cannot perform this operation.
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },
}

impl StoreError {
    /// Classify a failed remote invocation of `function`.
    pub fn remote_call(function: &str, err: ConductorError) -> Self {
        match err {
            ConductorError::CallFailed { function, message } => {
                Self::RemoteCall { function, message }
            }
            ConductorError::Serialization(msg) => Self::Serialization(msg),
            other => Self::RemoteCall {
                function: function.to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
