use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use crate::{Envelope, MessageTransport, MessagingError, Result, Subscription};

/// Deliveries allowed before an abandoned message is dead-lettered.
pub const DEFAULT_MAX_DELIVERY_COUNT: u32 = 5;

/// A message that was taken out of circulation.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub topic: String,
    pub subscription: String,
    pub envelope: Envelope,
    pub reason: String,
}

type Subscribers = HashMap<String, mpsc::UnboundedSender<Envelope>>;

/// In-memory pub/sub transport.
///
/// Each subscription is an unbounded queue. Sending to a topic nobody
/// subscribed to is accepted and the message is dropped. Sent envelopes are
/// only kept for inspection when the transport is built
/// [`with_history`](InMemoryTransport::with_history).
#[derive(Clone)]
pub struct InMemoryTransport {
    max_delivery_count: u32,
    record_history: bool,
    topics: Arc<RwLock<HashMap<String, Subscribers>>>,
    published: Arc<RwLock<HashMap<String, Vec<Envelope>>>>,
    dead_letters: Arc<RwLock<Vec<DeadLetter>>>,
    completed: Arc<AtomicU64>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::with_max_delivery_count(DEFAULT_MAX_DELIVERY_COUNT)
    }
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that dead-letters a message on its
    /// `max_delivery_count`-th abandonment.
    pub fn with_max_delivery_count(max_delivery_count: u32) -> Self {
        Self {
            max_delivery_count: max_delivery_count.max(1),
            record_history: false,
            topics: Arc::new(RwLock::new(HashMap::new())),
            published: Arc::new(RwLock::new(HashMap::new())),
            dead_letters: Arc::new(RwLock::new(Vec::new())),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Keeps a copy of every sent envelope for [`published`](Self::published).
    ///
    /// History is never trimmed, so this is meant for tests.
    pub fn with_history(mut self) -> Self {
        self.record_history = true;
        self
    }

    pub fn max_delivery_count(&self) -> u32 {
        self.max_delivery_count
    }

    /// Every envelope sent to `topic`, in send order. Always empty unless
    /// history is on.
    pub async fn published(&self, topic: &str) -> Vec<Envelope> {
        self.published
            .read()
            .await
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.read().await.clone()
    }

    /// Number of messages settled with `complete`.
    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Drops every subscription queue. Pending receivers see `None`.
    pub async fn close(&self) {
        self.topics.write().await.clear();
    }

    async fn requeue(&self, topic: &str, subscription: &str, envelope: Envelope) -> Result<()> {
        let topics = self.topics.read().await;
        let sender = topics
            .get(topic)
            .and_then(|subscribers| subscribers.get(subscription))
            .ok_or_else(|| MessagingError::SubscriptionClosed {
                topic: topic.to_string(),
                subscription: subscription.to_string(),
            })?;

        sender
            .send(envelope)
            .map_err(|_| MessagingError::SubscriptionClosed {
                topic: topic.to_string(),
                subscription: subscription.to_string(),
            })
    }

    async fn record_dead_letter(
        &self,
        topic: &str,
        subscription: &str,
        envelope: Envelope,
        reason: &str,
    ) {
        tracing::warn!(
            topic,
            subscription,
            message_id = %envelope.message_id,
            message_type = %envelope.message_type,
            delivery_count = envelope.delivery_count,
            reason,
            "message dead-lettered"
        );
        self.dead_letters.write().await.push(DeadLetter {
            topic: topic.to_string(),
            subscription: subscription.to_string(),
            envelope,
            reason: reason.to_string(),
        });
    }
}

#[async_trait]
impl MessageTransport for InMemoryTransport {
    async fn send(&self, topic: &str, envelope: Envelope) -> Result<()> {
        {
            let topics = self.topics.read().await;
            if let Some(subscribers) = topics.get(topic) {
                for (name, sender) in subscribers {
                    if sender.send(envelope.clone()).is_err() {
                        tracing::warn!(topic, subscription = %name, "subscriber queue closed");
                    }
                }
            }
        }

        if self.record_history {
            self.published
                .write()
                .await
                .entry(topic.to_string())
                .or_default()
                .push(envelope);
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str, subscription: &str) -> Result<Box<dyn Subscription>> {
        let mut topics = self.topics.write().await;
        let subscribers = topics.entry(topic.to_string()).or_default();
        if subscribers
            .get(subscription)
            .is_some_and(|sender| !sender.is_closed())
        {
            return Err(MessagingError::AlreadySubscribed {
                topic: topic.to_string(),
                subscription: subscription.to_string(),
            });
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        subscribers.insert(subscription.to_string(), sender);

        Ok(Box::new(InMemorySubscription {
            topic: topic.to_string(),
            name: subscription.to_string(),
            receiver,
            transport: self.clone(),
        }))
    }
}

/// Receiving side of a subscription on an [`InMemoryTransport`].
pub struct InMemorySubscription {
    topic: String,
    name: String,
    receiver: mpsc::UnboundedReceiver<Envelope>,
    transport: InMemoryTransport,
}

#[async_trait]
impl Subscription for InMemorySubscription {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn next(&mut self) -> Option<Envelope> {
        let mut envelope = self.receiver.recv().await?;
        envelope.delivery_count += 1;
        Some(envelope)
    }

    async fn complete(&self, _envelope: &Envelope) -> Result<()> {
        self.transport.completed.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn abandon(&self, envelope: Envelope) -> Result<()> {
        if envelope.delivery_count >= self.transport.max_delivery_count {
            let reason = format!(
                "Max delivery count of {} exceeded",
                self.transport.max_delivery_count
            );
            self.transport
                .record_dead_letter(&self.topic, &self.name, envelope, &reason)
                .await;
            return Ok(());
        }

        tracing::debug!(
            topic = %self.topic,
            subscription = %self.name,
            message_id = %envelope.message_id,
            delivery_count = envelope.delivery_count,
            "message abandoned, redelivering"
        );
        self.transport
            .requeue(&self.topic, &self.name, envelope)
            .await
    }

    async fn dead_letter(&self, envelope: Envelope, reason: &str) -> Result<()> {
        self.transport
            .record_dead_letter(&self.topic, &self.name, envelope, reason)
            .await;
        Ok(())
    }
}
