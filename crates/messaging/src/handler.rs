use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{Envelope, HandlerError};

/// What the consumer should do with a message once its handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// Handled. The message is completed.
    Completed,

    /// Handled, but the business process rejected it. The message is
    /// completed and not retried.
    Failed(String),

    /// Not handled yet. The message is abandoned for redelivery.
    Retry(String),
}

impl ProcessingOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn retry(reason: impl Into<String>) -> Self {
        Self::Retry(reason.into())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
            Self::Retry(_) => "retry",
        }
    }
}

/// Handles raw envelopes for a fixed set of message types.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Message types this handler accepts. Anything else is dead-lettered.
    fn message_types(&self) -> Vec<&'static str>;

    async fn handle(&self, envelope: &Envelope) -> Result<ProcessingOutcome, HandlerError>;
}

/// A handler for a single message type with a typed payload.
///
/// Wrap it with [`typed`] to get a [`MessageHandler`].
#[async_trait]
pub trait TypedHandler: Send + Sync {
    type Message: DeserializeOwned + Send;

    const NAME: &'static str;
    const MESSAGE_TYPE: &'static str;

    async fn handle_message(
        &self,
        message: Self::Message,
        envelope: &Envelope,
    ) -> Result<ProcessingOutcome, HandlerError>;
}

/// Adapts a [`TypedHandler`] into a [`MessageHandler`].
pub struct TypedAdapter<H>(H);

#[async_trait]
impl<H: TypedHandler> MessageHandler for TypedAdapter<H> {
    fn name(&self) -> &'static str {
        H::NAME
    }

    fn message_types(&self) -> Vec<&'static str> {
        vec![H::MESSAGE_TYPE]
    }

    async fn handle(&self, envelope: &Envelope) -> Result<ProcessingOutcome, HandlerError> {
        let message: H::Message =
            envelope
                .decode()
                .map_err(|source| HandlerError::Deserialization {
                    message_type: envelope.message_type.clone(),
                    source,
                })?;
        self.0.handle_message(message, envelope).await
    }
}

/// Wraps a typed handler for use with a consumer.
pub fn typed<H: TypedHandler + 'static>(handler: H) -> Arc<dyn MessageHandler> {
    Arc::new(TypedAdapter(handler))
}
