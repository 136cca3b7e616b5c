//! Operations over the invoice lifecycle.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::operation::Operation;
use crate::value_objects::{OrderNumber, Price};

use super::state::{
    GeneratedInvoice, InvalidInvoice, Invoice, UnvalidatedInvoice, ValidatedInvoice,
};

/// Per-variant hooks for an invoice operation. Every hook defaults to identity.
pub trait InvoiceOperation {
    const NAME: &'static str;

    fn on_unvalidated(&self, invoice: UnvalidatedInvoice) -> Invoice {
        Invoice::Unvalidated(invoice)
    }

    fn on_validated(&self, invoice: ValidatedInvoice) -> Invoice {
        Invoice::Validated(invoice)
    }

    fn on_generated(&self, invoice: GeneratedInvoice) -> Invoice {
        Invoice::Generated(invoice)
    }
}

impl<T: InvoiceOperation> Operation<Invoice> for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn transform(&self, invoice: Invoice) -> Invoice {
        match invoice {
            Invoice::Unvalidated(i) => self.on_unvalidated(i),
            Invoice::Validated(i) => self.on_validated(i),
            Invoice::Generated(i) => self.on_generated(i),
            Invoice::Invalid(i) => Invoice::Invalid(i),
        }
    }
}

/// Parses the order number and total and checks the customer name.
pub struct ValidateInvoiceOperation;

impl InvoiceOperation for ValidateInvoiceOperation {
    const NAME: &'static str = "validate_invoice";

    fn on_unvalidated(&self, invoice: UnvalidatedInvoice) -> Invoice {
        let mut reasons = Vec::new();

        let order_number = OrderNumber::try_parse(&invoice.order_number)
            .inspect_err(|_| reasons.push("Invalid order number format".to_string()))
            .ok();

        let customer_name = invoice.customer_name.trim();
        if customer_name.is_empty() {
            reasons.push("Customer name is required".to_string());
        }

        let total_amount = Price::try_parse(&invoice.total_amount)
            .inspect_err(|_| reasons.push("Invalid total amount".to_string()))
            .ok();

        match (order_number, total_amount) {
            (Some(order_number), Some(total_amount)) if reasons.is_empty() => {
                Invoice::Validated(ValidatedInvoice {
                    order_number,
                    customer_name: customer_name.to_string(),
                    total_amount,
                })
            }
            _ => Invoice::Invalid(InvalidInvoice::new(reasons)),
        }
    }
}

/// Computes VAT and assigns the invoice number.
///
/// `vat = round(total * rate, 2)` half away from zero, and
/// `total_with_vat = total + vat` with no second rounding.
pub struct CalculateVatOperation<G> {
    vat_rate: Decimal,
    invoice_number_generator: G,
}

impl<G> CalculateVatOperation<G>
where
    G: Fn(&OrderNumber) -> String,
{
    pub fn new(vat_rate: Decimal, invoice_number_generator: G) -> Self {
        Self {
            vat_rate,
            invoice_number_generator,
        }
    }
}

impl<G> InvoiceOperation for CalculateVatOperation<G>
where
    G: Fn(&OrderNumber) -> String,
{
    const NAME: &'static str = "calculate_vat";

    fn on_validated(&self, invoice: ValidatedInvoice) -> Invoice {
        let amounts = invoice.total_amount.vat(self.vat_rate).and_then(|vat| {
            invoice
                .total_amount
                .checked_add(vat)
                .map(|with_vat| (vat, with_vat))
        });
        let Ok((vat_amount, total_with_vat)) = amounts else {
            return Invoice::Invalid(InvalidInvoice::single("Failed to calculate VAT"));
        };

        let invoice_number = (self.invoice_number_generator)(&invoice.order_number);
        if invoice_number.trim().is_empty() {
            return Invoice::Invalid(InvalidInvoice::single(
                "Failed to generate invoice number",
            ));
        }

        Invoice::Generated(GeneratedInvoice {
            invoice_number,
            order_number: invoice.order_number,
            customer_name: invoice.customer_name,
            total_amount: invoice.total_amount,
            vat_amount,
            total_with_vat,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::operation::Lifecycle;

    fn raw(order_number: &str, customer_name: &str, total: &str) -> Invoice {
        Invoice::Unvalidated(UnvalidatedInvoice {
            order_number: order_number.to_string(),
            customer_name: customer_name.to_string(),
            total_amount: total.to_string(),
        })
    }

    fn validated(total: &str) -> ValidatedInvoice {
        match ValidateInvoiceOperation.transform(raw("ORD-20250101-0001", "Ana", total)) {
            Invoice::Validated(invoice) => invoice,
            other => panic!("expected Validated, got {other:?}"),
        }
    }

    fn rate(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    fn invoice_number(order_number: &OrderNumber) -> String {
        format!("INV-{order_number}")
    }

    #[test]
    fn test_validate_accumulates_all_errors() {
        let invoice = ValidateInvoiceOperation.transform(raw("ORD-1", "", "-5"));
        let Invoice::Invalid(invalid) = invoice else {
            panic!("expected Invalid");
        };
        assert_eq!(
            invalid.reasons,
            vec![
                "Invalid order number format".to_string(),
                "Customer name is required".to_string(),
                "Invalid total amount".to_string(),
            ]
        );
    }

    #[test]
    fn test_vat_is_rounded_half_away_from_zero() {
        let generated = CalculateVatOperation::new(rate("0.19"), invoice_number)
            .transform(Invoice::Validated(validated("10.05")));
        let Invoice::Generated(invoice) = generated else {
            panic!("expected Generated");
        };
        // 10.05 * 0.19 = 1.9095
        assert_eq!(invoice.vat_amount, Price::try_parse("1.91").unwrap());
        assert_eq!(invoice.total_with_vat, Price::try_parse("11.96").unwrap());
        assert_eq!(invoice.invoice_number, "INV-ORD-20250101-0001");
    }

    #[test]
    fn test_blank_invoice_number_is_rejected() {
        let generated = CalculateVatOperation::new(rate("0.19"), |_: &OrderNumber| String::new())
            .transform(Invoice::Validated(validated("100.00")));
        assert_eq!(
            generated.reasons(),
            &["Failed to generate invoice number".to_string()]
        );
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let generated = CalculateVatOperation::new(rate("-0.19"), invoice_number)
            .transform(Invoice::Validated(validated("100.00")));
        assert_eq!(generated.reasons(), &["Failed to calculate VAT".to_string()]);
    }

    #[test]
    fn test_operations_are_noop_on_untargeted_variants() {
        let calculate = CalculateVatOperation::new(rate("0.19"), invoice_number);
        let generated = calculate.transform(Invoice::Validated(validated("100.00")));
        let invalid = Invoice::Invalid(InvalidInvoice::single("earlier failure"));

        for variant in [
            Invoice::Validated(validated("1.00")),
            generated.clone(),
            invalid.clone(),
        ] {
            assert_eq!(ValidateInvoiceOperation.transform(variant.clone()), variant);
        }
        for variant in [raw("x", "y", "z"), generated, invalid] {
            assert_eq!(calculate.transform(variant.clone()), variant);
        }
    }
}
