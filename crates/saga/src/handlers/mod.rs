//! One handler per saga stage.
//!
//! Each handler runs a domain workflow, persists the result through a state
//! service and publishes the next event with the inbound correlation id.
//! Business rejections are recorded per correlation id, announced on
//! `saga-failures` and come back as [`ProcessingOutcome::Failed`]; state or
//! transport errors surface as `Err` so the message is redelivered.
//!
//! [`ProcessingOutcome::Failed`]: messaging::ProcessingOutcome::Failed

use common::message_types;
use messaging::{HandlerError, MessageTransport, ProcessingOutcome};

use crate::services::{OrderStateService, RejectionRecord};
use crate::topics;

mod billing;
mod failure_tracking;
mod package_tracking;
mod place_order;
mod shipping;

pub use billing::BillingHandler;
pub use failure_tracking::FailureTrackingHandler;
pub use package_tracking::PackageTrackingHandler;
pub use place_order::PlaceOrderHandler;
pub use shipping::ShippingHandler;

/// Keeps the rejection for status queries and publishes it onward.
async fn reject<O, T>(
    orders: &O,
    transport: &T,
    rejection: RejectionRecord,
) -> Result<ProcessingOutcome, HandlerError>
where
    O: OrderStateService,
    T: MessageTransport,
{
    tracing::warn!(
        stage = %rejection.stage,
        reasons = ?rejection.failure.reasons,
        "request rejected"
    );
    orders.save_rejection(&rejection).await?;
    transport
        .publish(
            topics::SAGA_FAILURES,
            message_types::SAGA_FAILED,
            rejection.correlation_id,
            &rejection.to_dto(),
        )
        .await?;
    Ok(ProcessingOutcome::failed(rejection.failure.to_string()))
}
