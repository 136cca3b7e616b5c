//! Saga error types.

use messaging::{HandlerError, MessagingError};
use thiserror::Error;

/// Errors that can occur while running the saga.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Transport failure.
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    /// A state service could not read or persist.
    #[error("State service error: {0}")]
    StateService(String),

    /// The order is not known to the order state service.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Every saga error is an infrastructure failure from the consumer's point
/// of view, so the message is redelivered.
impl From<SagaError> for HandlerError {
    fn from(err: SagaError) -> Self {
        match err {
            SagaError::Messaging(e) => HandlerError::Messaging(e),
            other => HandlerError::Infrastructure(other.to_string()),
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
