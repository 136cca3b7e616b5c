use crate::operation::{Lifecycle, Operation, run_pipeline};
use crate::value_objects::{OrderNumber, Price};

use super::commands::PlaceOrderCommand;
use super::events::OrderPlacedEvent;
use super::operations::{ConfirmOrderOperation, PayOrderOperation, ValidateOrderOperation};
use super::state::{Order, UnvalidatedOrder};

/// Places an order: validate, then confirm, then optionally pay.
pub struct OrderProcessingWorkflow;

impl OrderProcessingWorkflow {
    /// Runs validation and confirmation.
    ///
    /// `stock_check(product, quantity)` answers whether the product is in
    /// stock; `order_number_generator` yields the number assigned on
    /// confirmation.
    pub fn execute<S, G>(
        command: PlaceOrderCommand,
        stock_check: S,
        order_number_generator: G,
    ) -> OrderPlacedEvent
    where
        S: Fn(&str, u32) -> bool,
        G: Fn() -> String,
    {
        let validate = ValidateOrderOperation::new(stock_check);
        let confirm = ConfirmOrderOperation::new(order_number_generator);
        let steps: [&dyn Operation<Order>; 2] = [&validate, &confirm];

        Self::finish(run_pipeline(
            Order::Unvalidated(UnvalidatedOrder::from(command)),
            &steps,
        ))
    }

    /// Same as [`execute`](Self::execute) followed by payment confirmation.
    pub fn execute_with_payment<S, G, P>(
        command: PlaceOrderCommand,
        stock_check: S,
        order_number_generator: G,
        confirm_payment: P,
    ) -> OrderPlacedEvent
    where
        S: Fn(&str, u32) -> bool,
        G: Fn() -> String,
        P: Fn(&OrderNumber, Price) -> bool,
    {
        let validate = ValidateOrderOperation::new(stock_check);
        let confirm = ConfirmOrderOperation::new(order_number_generator);
        let pay = PayOrderOperation::new(confirm_payment);
        let steps: [&dyn Operation<Order>; 3] = [&validate, &confirm, &pay];

        Self::finish(run_pipeline(
            Order::Unvalidated(UnvalidatedOrder::from(command)),
            &steps,
        ))
    }

    fn finish(order: Order) -> OrderPlacedEvent {
        let outcome = if order.is_invalid() { "failed" } else { "succeeded" };
        metrics::counter!(
            "workflow_executions_total",
            "workflow" => "order_processing",
            "outcome" => outcome
        )
        .increment(1);
        OrderPlacedEvent::from_order(order)
    }
}
