use async_trait::async_trait;
use common::{SagaFailedDto, message_types};
use messaging::{Envelope, HandlerError, ProcessingOutcome, TypedHandler};

/// Terminal consumer for rejected requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailureTrackingHandler;

#[async_trait]
impl TypedHandler for FailureTrackingHandler {
    type Message = SagaFailedDto;

    const NAME: &'static str = "failure_tracking";
    const MESSAGE_TYPE: &'static str = message_types::SAGA_FAILED;

    async fn handle_message(
        &self,
        failure: SagaFailedDto,
        envelope: &Envelope,
    ) -> Result<ProcessingOutcome, HandlerError> {
        tracing::info!(
            stage = %failure.stage,
            order_number = failure.order_number.as_deref().unwrap_or("-"),
            reasons = ?failure.reasons,
            correlation_id = %envelope.correlation_id,
            "order fulfillment saga ended in failure"
        );
        metrics::counter!("saga_failed_total", "stage" => failure.stage).increment(1);
        Ok(ProcessingOutcome::Completed)
    }
}
