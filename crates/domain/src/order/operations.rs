//! Operations over the order lifecycle.

use chrono::Utc;

use crate::operation::Operation;
use crate::value_objects::{DeliveryAddress, OrderNumber, Price};

use super::state::{
    ConfirmedOrder, InvalidOrder, Order, OrderLine, PaidOrder, UnvalidatedOrder, ValidatedOrder,
};

/// Per-variant hooks for an order operation. Every hook defaults to identity.
///
/// `Invalid` has no hook; the blanket [`Operation`] impl always passes it
/// through.
pub trait OrderOperation {
    const NAME: &'static str;

    fn on_unvalidated(&self, order: UnvalidatedOrder) -> Order {
        Order::Unvalidated(order)
    }

    fn on_validated(&self, order: ValidatedOrder) -> Order {
        Order::Validated(order)
    }

    fn on_confirmed(&self, order: ConfirmedOrder) -> Order {
        Order::Confirmed(order)
    }

    fn on_paid(&self, order: PaidOrder) -> Order {
        Order::Paid(order)
    }
}

impl<T: OrderOperation> Operation<Order> for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn transform(&self, order: Order) -> Order {
        match order {
            Order::Unvalidated(o) => self.on_unvalidated(o),
            Order::Validated(o) => self.on_validated(o),
            Order::Confirmed(o) => self.on_confirmed(o),
            Order::Paid(o) => self.on_paid(o),
            Order::Invalid(o) => Order::Invalid(o),
        }
    }
}

/// Checks every field of a raw order and the stock for each line.
///
/// All failing checks are reported together.
pub struct ValidateOrderOperation<F> {
    stock_check: F,
}

impl<F> ValidateOrderOperation<F>
where
    F: Fn(&str, u32) -> bool,
{
    /// `stock_check(product, quantity)` returns true when enough stock exists.
    pub fn new(stock_check: F) -> Self {
        Self { stock_check }
    }

    fn validate_line(
        &self,
        position: usize,
        product_name: &str,
        quantity: &str,
        unit_price: &str,
        reasons: &mut Vec<String>,
    ) -> Option<OrderLine> {
        let name = product_name.trim();
        if name.is_empty() {
            reasons.push(format!("Item {position}: product name is required"));
        }

        let quantity = match quantity.trim().parse::<u32>() {
            Ok(q) if q > 0 => Some(q),
            _ => {
                reasons.push(format!(
                    "Item {position}: quantity must be a positive integer"
                ));
                None
            }
        };

        let unit_price = match Price::try_parse(unit_price) {
            Ok(price) => Some(price),
            Err(_) => {
                reasons.push(format!(
                    "Item {position}: unit price must be a non-negative decimal"
                ));
                None
            }
        };

        // Stock can only be asked about a well-formed product and quantity.
        if let (false, Some(q)) = (name.is_empty(), quantity) {
            if !(self.stock_check)(name, q) {
                reasons.push(format!("Insufficient stock for {name}"));
            }
        }

        match (name.is_empty(), quantity, unit_price) {
            (false, Some(quantity), Some(unit_price)) => Some(OrderLine {
                product_name: name.to_string(),
                quantity,
                unit_price,
            }),
            _ => None,
        }
    }
}

impl<F> OrderOperation for ValidateOrderOperation<F>
where
    F: Fn(&str, u32) -> bool,
{
    const NAME: &'static str = "validate_order";

    fn on_unvalidated(&self, order: UnvalidatedOrder) -> Order {
        let mut reasons = Vec::new();

        if order.customer_name.trim().is_empty() {
            reasons.push("Customer name is required".to_string());
        }
        if !order.customer_email.contains('@') {
            reasons.push("Customer email must contain '@'".to_string());
        }

        let address = DeliveryAddress::try_new(
            &order.delivery_street,
            &order.delivery_city,
            &order.delivery_postal_code,
            &order.delivery_country,
        );
        if address.is_err() {
            reasons.push("Delivery address is incomplete".to_string());
        }

        if order.lines.is_empty() {
            reasons.push("Order must contain at least one item".to_string());
        }

        let lines: Vec<OrderLine> = order
            .lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                self.validate_line(
                    index + 1,
                    &line.product_name,
                    &line.quantity,
                    &line.unit_price,
                    &mut reasons,
                )
            })
            .collect();

        match address {
            Ok(address) if reasons.is_empty() => Order::Validated(ValidatedOrder {
                customer_name: order.customer_name.trim().to_string(),
                customer_email: order.customer_email.trim().to_string(),
                address,
                lines,
            }),
            _ => Order::Invalid(InvalidOrder::new(reasons)),
        }
    }
}

/// Assigns an order number and computes the total.
pub struct ConfirmOrderOperation<G> {
    order_number_generator: G,
}

impl<G> ConfirmOrderOperation<G>
where
    G: Fn() -> String,
{
    pub fn new(order_number_generator: G) -> Self {
        Self {
            order_number_generator,
        }
    }
}

impl<G> OrderOperation for ConfirmOrderOperation<G>
where
    G: Fn() -> String,
{
    const NAME: &'static str = "confirm_order";

    fn on_validated(&self, order: ValidatedOrder) -> Order {
        let Ok(order_number) = OrderNumber::try_parse(&(self.order_number_generator)()) else {
            return Order::Invalid(InvalidOrder::single(
                "Failed to generate valid order number",
            ));
        };

        let total = order.lines.iter().try_fold(Price::zero(), |total, line| {
            line.line_total().and_then(|line_total| total.checked_add(line_total))
        });
        let Ok(total_amount) = total else {
            return Order::Invalid(InvalidOrder::single("Failed to compute order total"));
        };

        Order::Confirmed(ConfirmedOrder {
            order_number,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            address: order.address,
            lines: order.lines,
            total_amount,
            confirmed_at: Utc::now(),
        })
    }
}

/// Settles payment for a confirmed order through an injected confirmation.
pub struct PayOrderOperation<P> {
    confirm_payment: P,
}

impl<P> PayOrderOperation<P>
where
    P: Fn(&OrderNumber, Price) -> bool,
{
    pub fn new(confirm_payment: P) -> Self {
        Self { confirm_payment }
    }
}

impl<P> OrderOperation for PayOrderOperation<P>
where
    P: Fn(&OrderNumber, Price) -> bool,
{
    const NAME: &'static str = "pay_order";

    fn on_confirmed(&self, order: ConfirmedOrder) -> Order {
        if !(self.confirm_payment)(&order.order_number, order.total_amount) {
            return Order::Invalid(InvalidOrder::single("Payment was not confirmed"));
        }
        Order::Paid(PaidOrder {
            order,
            paid_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::state::UnvalidatedOrderLine;

    fn raw_order() -> UnvalidatedOrder {
        UnvalidatedOrder {
            customer_name: "Ana Popescu".to_string(),
            customer_email: "ana@example.com".to_string(),
            delivery_street: "Str. Lalelelor 1".to_string(),
            delivery_city: "Timisoara".to_string(),
            delivery_postal_code: "300001".to_string(),
            delivery_country: "RO".to_string(),
            lines: vec![
                UnvalidatedOrderLine {
                    product_name: "Laptop".to_string(),
                    quantity: "2".to_string(),
                    unit_price: "1000.50".to_string(),
                },
                UnvalidatedOrderLine {
                    product_name: "Mouse".to_string(),
                    quantity: "1".to_string(),
                    unit_price: "49.90".to_string(),
                },
            ],
        }
    }

    fn validated() -> ValidatedOrder {
        match ValidateOrderOperation::new(|_: &str, _: u32| true)
            .transform(Order::Unvalidated(raw_order()))
        {
            Order::Validated(order) => order,
            other => panic!("expected Validated, got {other:?}"),
        }
    }

    fn confirmed() -> ConfirmedOrder {
        match ConfirmOrderOperation::new(|| "ORD-20250101-0001".to_string())
            .transform(Order::Validated(validated()))
        {
            Order::Confirmed(order) => order,
            other => panic!("expected Confirmed, got {other:?}"),
        }
    }

    fn reasons_of(order: Order) -> Vec<String> {
        match order {
            Order::Invalid(invalid) => invalid.reasons,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_order() {
        let order = validated();
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.address.city(), "Timisoara");
    }

    #[test]
    fn test_validate_accumulates_all_errors() {
        let mut raw = raw_order();
        raw.customer_email = String::new();
        raw.lines[0].quantity = "0".to_string();

        let reasons = reasons_of(
            ValidateOrderOperation::new(|_: &str, _: u32| true)
                .transform(Order::Unvalidated(raw)),
        );

        assert_eq!(
            reasons,
            vec![
                "Customer email must contain '@'".to_string(),
                "Item 1: quantity must be a positive integer".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_reports_every_field() {
        let raw = UnvalidatedOrder {
            customer_name: " ".to_string(),
            customer_email: "nobody".to_string(),
            delivery_street: String::new(),
            delivery_city: "Cluj".to_string(),
            delivery_postal_code: "400001".to_string(),
            delivery_country: "RO".to_string(),
            lines: vec![],
        };

        let reasons = reasons_of(
            ValidateOrderOperation::new(|_: &str, _: u32| true)
                .transform(Order::Unvalidated(raw)),
        );

        assert_eq!(reasons.len(), 4);
        assert!(reasons.contains(&"Delivery address is incomplete".to_string()));
        assert!(reasons.contains(&"Order must contain at least one item".to_string()));
    }

    #[test]
    fn test_validate_rejects_insufficient_stock() {
        let reasons = reasons_of(
            ValidateOrderOperation::new(|product: &str, _: u32| product != "Laptop")
                .transform(Order::Unvalidated(raw_order())),
        );
        assert_eq!(reasons, vec!["Insufficient stock for Laptop".to_string()]);
    }

    #[test]
    fn test_validate_skips_stock_for_malformed_line() {
        let mut raw = raw_order();
        raw.lines[1].quantity = "many".to_string();
        raw.lines[1].unit_price = "-3".to_string();

        let reasons = reasons_of(
            ValidateOrderOperation::new(|product: &str, _: u32| {
                assert_ne!(product, "Mouse", "stock checked for malformed line");
                true
            })
            .transform(Order::Unvalidated(raw)),
        );

        assert_eq!(
            reasons,
            vec![
                "Item 2: quantity must be a positive integer".to_string(),
                "Item 2: unit price must be a non-negative decimal".to_string(),
            ]
        );
    }

    #[test]
    fn test_confirm_computes_total() {
        let order = confirmed();
        assert_eq!(order.order_number.value(), "ORD-20250101-0001");
        assert_eq!(order.total_amount, Price::try_parse("2050.90").unwrap());
    }

    #[test]
    fn test_confirm_rejects_malformed_order_number() {
        let reasons = reasons_of(
            ConfirmOrderOperation::new(|| "12345".to_string())
                .transform(Order::Validated(validated())),
        );
        assert_eq!(
            reasons,
            vec!["Failed to generate valid order number".to_string()]
        );
    }

    #[test]
    fn test_pay_moves_confirmed_to_paid() {
        let order = PayOrderOperation::new(|_: &OrderNumber, _: Price| true)
            .transform(Order::Confirmed(confirmed()));
        assert!(matches!(order, Order::Paid(_)));

        let declined = PayOrderOperation::new(|_: &OrderNumber, _: Price| false)
            .transform(Order::Confirmed(confirmed()));
        assert_eq!(
            reasons_of(declined),
            vec!["Payment was not confirmed".to_string()]
        );
    }

    #[test]
    fn test_operations_are_noop_on_untargeted_variants() {
        let validate = ValidateOrderOperation::new(|_: &str, _: u32| false);
        let confirm = ConfirmOrderOperation::new(|| "garbage".to_string());
        let pay = PayOrderOperation::new(|_: &OrderNumber, _: Price| false);

        let paid = Order::Paid(PaidOrder {
            order: confirmed(),
            paid_at: Utc::now(),
        });
        let invalid = Order::Invalid(InvalidOrder::single("earlier failure"));

        for variant in [
            Order::Validated(validated()),
            Order::Confirmed(confirmed()),
            paid.clone(),
            invalid.clone(),
        ] {
            assert_eq!(validate.transform(variant.clone()), variant);
        }
        for variant in [
            Order::Unvalidated(raw_order()),
            Order::Confirmed(confirmed()),
            paid.clone(),
            invalid.clone(),
        ] {
            assert_eq!(confirm.transform(variant.clone()), variant);
        }
        for variant in [
            Order::Unvalidated(raw_order()),
            Order::Validated(validated()),
            paid,
            invalid,
        ] {
            assert_eq!(pay.transform(variant.clone()), variant);
        }
    }
}
