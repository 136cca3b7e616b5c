use async_trait::async_trait;
use common::CorrelationId;
use serde::Serialize;

use crate::{Envelope, MessageId, MessagingError, Result};

/// A pub/sub transport with at-least-once delivery.
///
/// Sending to a topic delivers a copy to every subscription on it. A message
/// stays with its subscription until the consumer settles it.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Sends an envelope to a topic.
    async fn send(&self, topic: &str, envelope: Envelope) -> Result<()>;

    /// Opens the receiving side of a named subscription on a topic.
    async fn subscribe(&self, topic: &str, subscription: &str) -> Result<Box<dyn Subscription>>;

    /// Wraps `message` in an envelope and sends it.
    async fn publish<T>(
        &self,
        topic: &str,
        message_type: &str,
        correlation_id: CorrelationId,
        message: &T,
    ) -> Result<MessageId>
    where
        Self: Sized,
        T: Serialize + Sync,
    {
        let envelope = Envelope::builder()
            .message_type(message_type)
            .correlation_id(correlation_id)
            .payload(message)?
            .try_build()
            .ok_or_else(|| MessagingError::Transport("incomplete envelope".to_string()))?;
        let message_id = envelope.message_id;

        self.send(topic, envelope).await?;
        tracing::debug!(topic, message_type, %message_id, %correlation_id, "message published");
        Ok(message_id)
    }
}

/// Receiving side of one subscription.
///
/// Every envelope returned by [`next`](Subscription::next) must be settled
/// exactly once with `complete`, `abandon` or `dead_letter`.
#[async_trait]
pub trait Subscription: Send + Sync {
    fn topic(&self) -> &str;

    fn name(&self) -> &str;

    /// Waits for the next delivery. `None` once the subscription is closed.
    async fn next(&mut self) -> Option<Envelope>;

    /// Removes the message for good.
    async fn complete(&self, envelope: &Envelope) -> Result<()>;

    /// Gives the message back for redelivery.
    async fn abandon(&self, envelope: Envelope) -> Result<()>;

    /// Moves the message aside so it is never delivered again.
    async fn dead_letter(&self, envelope: Envelope, reason: &str) -> Result<()>;
}
