use async_trait::async_trait;
use common::{PackageDeliveredDto, PackageShippedDto, message_types};
use messaging::{Envelope, HandlerError, MessageHandler, ProcessingOutcome};

/// Terminal stage: records that an order went all the way through.
///
/// Accepts both package event types, so it implements [`MessageHandler`]
/// directly instead of going through the typed adapter.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageTrackingHandler;

impl PackageTrackingHandler {
    fn decode<T: serde::de::DeserializeOwned>(envelope: &Envelope) -> Result<T, HandlerError> {
        envelope
            .decode()
            .map_err(|source| HandlerError::Deserialization {
                message_type: envelope.message_type.clone(),
                source,
            })
    }
}

#[async_trait]
impl MessageHandler for PackageTrackingHandler {
    fn name(&self) -> &'static str {
        "package_tracking"
    }

    fn message_types(&self) -> Vec<&'static str> {
        vec![message_types::PACKAGE_SHIPPED, message_types::PACKAGE_DELIVERED]
    }

    async fn handle(&self, envelope: &Envelope) -> Result<ProcessingOutcome, HandlerError> {
        let (order_number, tracking_number, stage) = match envelope.message_type.as_str() {
            message_types::PACKAGE_SHIPPED => {
                let shipped: PackageShippedDto = Self::decode(envelope)?;
                (shipped.order_number, shipped.tracking_number, "shipped")
            }
            message_types::PACKAGE_DELIVERED => {
                let delivered: PackageDeliveredDto = Self::decode(envelope)?;
                (delivered.order_number, delivered.tracking_number, "delivered")
            }
            other => {
                return Ok(ProcessingOutcome::failed(format!(
                    "Unexpected message type {other}"
                )));
            }
        };

        tracing::info!(
            %order_number,
            %tracking_number,
            stage,
            correlation_id = %envelope.correlation_id,
            "order fulfillment saga completed"
        );
        metrics::counter!("saga_completed_total", "stage" => stage).increment(1);
        Ok(ProcessingOutcome::Completed)
    }
}
