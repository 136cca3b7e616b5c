//! Consumer loop: one task per subscription, one message at a time.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::{Envelope, MessageHandler, MessagingError, ProcessingOutcome, Subscription};

/// Handle to a running consumer.
///
/// Dropping the handle also stops the consumer, but only
/// [`shutdown`](ConsumerHandle::shutdown) waits for the in-flight message.
pub struct ConsumerHandle {
    topic: String,
    subscription: String,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConsumerHandle {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    /// Stops receiving and waits for the message being handled, if any.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) -> Result<(), MessagingError> {
        let _ = self.shutdown_tx.send(true);

        let task = self.task.lock().await.take();
        match task {
            Some(join_handle) => join_handle
                .await
                .map_err(|e| MessagingError::Consumer(e.to_string())),
            None => Ok(()),
        }
    }

    /// True once the loop has exited.
    pub async fn is_finished(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_none_or(|task| task.is_finished())
    }
}

/// Spawns a consumer that feeds `subscription` into `handler`.
pub fn spawn_consumer(
    subscription: Box<dyn Subscription>,
    handler: Arc<dyn MessageHandler>,
) -> ConsumerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let topic = subscription.topic().to_string();
    let name = subscription.name().to_string();

    tracing::info!(
        topic = %topic,
        subscription = %name,
        handler = handler.name(),
        "consumer started"
    );
    let task = tokio::spawn(run_consumer(subscription, handler, shutdown_rx));

    ConsumerHandle {
        topic,
        subscription: name,
        shutdown_tx,
        task: Mutex::new(Some(task)),
    }
}

async fn run_consumer(
    mut subscription: Box<dyn Subscription>,
    handler: Arc<dyn MessageHandler>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // Only the wait for a message races the shutdown signal. Once a
        // message is received it is handled and settled to completion.
        let envelope = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            next = subscription.next() => match next {
                Some(envelope) => envelope,
                None => {
                    tracing::info!(
                        topic = subscription.topic(),
                        subscription = subscription.name(),
                        "subscription closed"
                    );
                    break;
                }
            },
        };

        process(subscription.as_ref(), handler.as_ref(), envelope).await;
    }

    tracing::info!(
        topic = subscription.topic(),
        subscription = subscription.name(),
        "consumer stopped"
    );
}

#[tracing::instrument(
    skip_all,
    fields(
        topic = subscription.topic(),
        subscription = subscription.name(),
        message_id = %envelope.message_id,
        message_type = %envelope.message_type,
        correlation_id = %envelope.correlation_id,
        delivery_count = envelope.delivery_count,
    )
)]
async fn process(
    subscription: &dyn Subscription,
    handler: &dyn MessageHandler,
    envelope: Envelope,
) {
    let topic = subscription.topic().to_string();
    let name = subscription.name().to_string();
    metrics::counter!(
        "messages_received_total",
        "topic" => topic.clone(),
        "subscription" => name.clone()
    )
    .increment(1);

    if !handler
        .message_types()
        .iter()
        .any(|accepted| *accepted == envelope.message_type)
    {
        let reason = format!("Unknown message type {}", envelope.message_type);
        settle_dead_letter(subscription, envelope, &reason, &topic, &name).await;
        return;
    }

    let start = Instant::now();
    let result = handler.handle(&envelope).await;
    metrics::histogram!("message_handling_seconds", "handler" => handler.name())
        .record(start.elapsed().as_secs_f64());

    let settled = match result {
        Ok(ProcessingOutcome::Completed) => {
            tracing::debug!("message completed");
            complete(subscription, &envelope, &topic, &name).await
        }
        Ok(ProcessingOutcome::Failed(reason)) => {
            tracing::warn!(%reason, "message handled with business failure");
            complete(subscription, &envelope, &topic, &name).await
        }
        Ok(ProcessingOutcome::Retry(reason)) => {
            tracing::info!(%reason, "handler asked for retry");
            abandon(subscription, envelope, &topic, &name).await
        }
        Err(e) => {
            tracing::error!(error = %e, "handler failed");
            abandon(subscription, envelope, &topic, &name).await
        }
    };

    if let Err(e) = settled {
        tracing::error!(error = %e, "failed to settle message");
    }
}

async fn complete(
    subscription: &dyn Subscription,
    envelope: &Envelope,
    topic: &str,
    name: &str,
) -> Result<(), MessagingError> {
    subscription.complete(envelope).await?;
    metrics::counter!(
        "messages_completed_total",
        "topic" => topic.to_string(),
        "subscription" => name.to_string()
    )
    .increment(1);
    Ok(())
}

async fn abandon(
    subscription: &dyn Subscription,
    envelope: Envelope,
    topic: &str,
    name: &str,
) -> Result<(), MessagingError> {
    subscription.abandon(envelope).await?;
    metrics::counter!(
        "messages_abandoned_total",
        "topic" => topic.to_string(),
        "subscription" => name.to_string()
    )
    .increment(1);
    Ok(())
}

async fn settle_dead_letter(
    subscription: &dyn Subscription,
    envelope: Envelope,
    reason: &str,
    topic: &str,
    name: &str,
) {
    match subscription.dead_letter(envelope, reason).await {
        Ok(()) => {
            metrics::counter!(
                "messages_dead_lettered_total",
                "topic" => topic.to_string(),
                "subscription" => name.to_string()
            )
            .increment(1);
        }
        Err(e) => tracing::error!(error = %e, "failed to dead-letter message"),
    }
}
