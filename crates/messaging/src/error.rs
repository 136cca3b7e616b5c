use thiserror::Error;

/// Errors raised by a message transport.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// A payload could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The subscription no longer exists on the transport.
    #[error("Subscription {subscription} on {topic} is closed")]
    SubscriptionClosed { topic: String, subscription: String },

    /// The subscription already has an active receiver.
    #[error("Subscription {subscription} on {topic} already has a receiver")]
    AlreadySubscribed { topic: String, subscription: String },

    /// Any other transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A consumer task panicked or was aborted.
    #[error("Consumer task failed: {0}")]
    Consumer(String),
}

/// Errors returned by a message handler.
///
/// Any error leaves the message unsettled, so the transport redelivers it.
/// Business failures are not errors: they are reported as
/// [`ProcessingOutcome::Failed`](crate::ProcessingOutcome::Failed).
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The payload did not match the expected message shape.
    #[error("Failed to deserialize {message_type}: {source}")]
    Deserialization {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A collaborator (state service, transport) failed.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error(transparent)]
    Messaging(#[from] MessagingError),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, MessagingError>;
