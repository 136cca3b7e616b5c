//! The state-machine engine shared by every workflow.
//!
//! An entity lifecycle is a closed enum. An [`Operation`] is a pure
//! `entity -> entity` step; [`run_pipeline`] threads an entity through an
//! ordered list of them. Per-entity dispatch traits (`OrderOperation`,
//! `InvoiceOperation`, `PackageOperation`) provide one hook per variant that
//! defaults to identity, so an operation only spells out the variants it
//! transforms.

use serde::{Deserialize, Serialize};

/// A closed set of lifecycle states for one kind of entity.
pub trait Lifecycle: Sized {
    /// Name of the entity kind, e.g. `"Order"`.
    fn kind() -> &'static str;

    /// Name of the current variant, e.g. `"Validated"`.
    fn state_name(&self) -> &'static str;

    /// True for the absorbing `Invalid` variant.
    fn is_invalid(&self) -> bool;

    /// Failure reasons carried by the `Invalid` variant, empty otherwise.
    fn reasons(&self) -> &[String];
}

/// A single-purpose transition over a lifecycle.
///
/// Implementations must return the input unchanged for any variant they do
/// not target, and must never move an entity to an earlier state.
pub trait Operation<E> {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Applies the transition.
    fn transform(&self, entity: E) -> E;
}

/// Runs `initial` through `operations` in order and returns the final state.
///
/// Once a step produces `Invalid`, later steps still run but, having no hook
/// for `Invalid`, hand it back untouched.
pub fn run_pipeline<E: Lifecycle>(initial: E, operations: &[&dyn Operation<E>]) -> E {
    operations.iter().fold(initial, |entity, operation| {
        let from = entity.state_name();
        let next = operation.transform(entity);
        tracing::debug!(
            entity = E::kind(),
            operation = operation.name(),
            from,
            to = next.state_name(),
            "operation applied"
        );
        if next.is_invalid() && from != next.state_name() {
            tracing::info!(
                entity = E::kind(),
                operation = operation.name(),
                reasons = ?next.reasons(),
                "entity became invalid"
            );
        }
        next
    })
}

/// Public failure shape returned to callers and logged by handlers.
///
/// Serializes as `{"success": false, "reasons": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowFailure {
    #[serde(default)]
    success: bool,
    pub reasons: Vec<String>,
}

impl WorkflowFailure {
    /// Creates a failure from a list of reasons.
    pub fn new(reasons: Vec<String>) -> Self {
        Self {
            success: false,
            reasons,
        }
    }

    /// Creates a failure with a single reason.
    pub fn single(reason: impl Into<String>) -> Self {
        Self::new(vec![reason.into()])
    }
}

impl std::fmt::Display for WorkflowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reasons.join("; "))
    }
}
