//! Business rejections recorded per request.

use chrono::{DateTime, Utc};
use common::{CorrelationId, SagaFailedDto};
use domain::WorkflowFailure;
use serde::Serialize;

/// Saga stage that turned a request down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStage {
    OrderPlacement,
    Billing,
    Shipping,
}

impl SagaStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderPlacement => "order_placement",
            Self::Billing => "billing",
            Self::Shipping => "shipping",
        }
    }
}

impl std::fmt::Display for SagaStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow failure kept under the correlation id of the request it ended.
///
/// Serializes with the failure flattened in, so clients see
/// `{"success": false, "reasons": [...]}` next to the stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionRecord {
    pub correlation_id: CorrelationId,
    pub stage: SagaStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(flatten)]
    pub failure: WorkflowFailure,
    pub rejected_at: DateTime<Utc>,
}

impl RejectionRecord {
    pub fn new(
        correlation_id: CorrelationId,
        stage: SagaStage,
        order_number: Option<String>,
        failure: WorkflowFailure,
    ) -> Self {
        Self {
            correlation_id,
            stage,
            order_number,
            failure,
            rejected_at: Utc::now(),
        }
    }

    pub fn to_dto(&self) -> SagaFailedDto {
        SagaFailedDto {
            stage: self.stage.as_str().to_string(),
            order_number: self.order_number.clone(),
            success: false,
            reasons: self.failure.reasons.clone(),
            failed_at: self.rejected_at,
        }
    }
}
