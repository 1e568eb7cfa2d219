use sharefeed_manager::ManagerError;
use sharefeed_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("cannot share {0}: only http and https pages can be shared")]
    NotShareable(String),

    #[error(transparent)]
    Manager(#[from] ManagerError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self::Manager(ManagerError::Store(e))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
