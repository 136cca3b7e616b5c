//! Order result events.

use chrono::{DateTime, Utc};
use common::OrderPlacedDto;
use serde::Serialize;

use crate::operation::WorkflowFailure;
use crate::value_objects::{DeliveryAddress, OrderNumber, Price};

use super::state::{ConfirmedOrder, Order, OrderLine};

/// Outcome of [`OrderProcessingWorkflow`](super::OrderProcessingWorkflow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OrderPlacedEvent {
    Succeeded(OrderPlaced),
    Failed(WorkflowFailure),
}

/// Public fields of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPlaced {
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_email: String,
    pub delivery_address: DeliveryAddress,
    pub lines: Vec<OrderLine>,
    pub total_amount: Price,
    pub placed_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl OrderPlaced {
    fn from_confirmed(order: ConfirmedOrder, paid_at: Option<DateTime<Utc>>) -> Self {
        Self {
            order_number: order.order_number,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            delivery_address: order.address,
            lines: order.lines,
            total_amount: order.total_amount,
            placed_at: order.confirmed_at,
            paid_at,
        }
    }

    /// Flattens the event into its wire shape.
    pub fn to_dto(&self) -> OrderPlacedDto {
        OrderPlacedDto {
            order_number: self.order_number.to_string(),
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            total_amount: self.total_amount.amount(),
            placed_at: self.placed_at,
            paid_at: self.paid_at,
            delivery_address: self.delivery_address.to_dto(),
        }
    }
}

impl OrderPlacedEvent {
    /// Maps any order state to an event.
    ///
    /// `Confirmed` and `Paid` succeed; every other state fails, with its own
    /// reasons when `Invalid` or a note on the stage that was not reached.
    pub fn from_order(order: Order) -> Self {
        match order {
            Order::Confirmed(order) => Self::Succeeded(OrderPlaced::from_confirmed(order, None)),
            Order::Paid(paid) => {
                Self::Succeeded(OrderPlaced::from_confirmed(paid.order, Some(paid.paid_at)))
            }
            Order::Unvalidated(_) => {
                Self::Failed(WorkflowFailure::single("Order was not validated"))
            }
            Order::Validated(_) => Self::Failed(WorkflowFailure::single("Order was not confirmed")),
            Order::Invalid(invalid) => Self::Failed(WorkflowFailure::new(invalid.reasons)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::state::{InvalidOrder, PaidOrder, UnvalidatedOrder, ValidatedOrder};

    fn confirmed() -> ConfirmedOrder {
        ConfirmedOrder {
            order_number: OrderNumber::try_parse("ORD-20250101-0001").unwrap(),
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
            address: DeliveryAddress::try_new("Str. 1", "Iasi", "700001", "RO").unwrap(),
            lines: vec![],
            total_amount: Price::try_parse("100.00").unwrap(),
            confirmed_at: Utc::now(),
        }
    }

    fn failure_reasons(event: OrderPlacedEvent) -> Vec<String> {
        match event {
            OrderPlacedEvent::Failed(failure) => failure.reasons,
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_every_state_maps_to_an_event() {
        let unvalidated = Order::Unvalidated(UnvalidatedOrder {
            customer_name: String::new(),
            customer_email: String::new(),
            delivery_street: String::new(),
            delivery_city: String::new(),
            delivery_postal_code: String::new(),
            delivery_country: String::new(),
            lines: vec![],
        });
        let validated = Order::Validated(ValidatedOrder {
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
            address: DeliveryAddress::try_new("Str. 1", "Iasi", "700001", "RO").unwrap(),
            lines: vec![],
        });

        assert_eq!(
            failure_reasons(OrderPlacedEvent::from_order(unvalidated)),
            vec!["Order was not validated".to_string()]
        );
        assert_eq!(
            failure_reasons(OrderPlacedEvent::from_order(validated)),
            vec!["Order was not confirmed".to_string()]
        );
        assert_eq!(
            failure_reasons(OrderPlacedEvent::from_order(Order::Invalid(InvalidOrder::new(
                vec!["a".to_string(), "b".to_string()]
            )))),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(OrderPlacedEvent::from_order(Order::Confirmed(confirmed())).is_success());
    }

    #[test]
    fn test_paid_order_carries_paid_at() {
        let paid_at = Utc::now();
        let event = OrderPlacedEvent::from_order(Order::Paid(PaidOrder {
            order: confirmed(),
            paid_at,
        }));

        let OrderPlacedEvent::Succeeded(placed) = event else {
            panic!("expected Succeeded");
        };
        assert_eq!(placed.paid_at, Some(paid_at));

        let dto = placed.to_dto();
        assert_eq!(dto.order_number, "ORD-20250101-0001");
        assert_eq!(dto.delivery_address.postal_code, "700001");
    }

    #[test]
    fn test_failure_serializes_with_success_flag() {
        let json = serde_json::to_value(OrderPlacedEvent::Failed(WorkflowFailure::single("x")))
            .unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "reasons": ["x"] }));
    }
}
