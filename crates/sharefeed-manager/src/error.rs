use sharefeed_store::StoreError;

/// Errors from storage manager operations.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Remote mode is forced and the remote backend cannot serve the call.
    #[error("remote backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// The resolved backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for storage manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;
