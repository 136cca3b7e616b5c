use rust_decimal::Decimal;

use crate::operation::{Lifecycle, Operation, run_pipeline};
use crate::value_objects::OrderNumber;

use super::commands::GenerateInvoiceCommand;
use super::events::InvoiceGeneratedEvent;
use super::operations::{CalculateVatOperation, ValidateInvoiceOperation};
use super::state::{Invoice, UnvalidatedInvoice};

/// Bills a placed order: validate, then compute VAT and number the invoice.
pub struct BillingWorkflow;

impl BillingWorkflow {
    pub fn execute<G>(
        command: GenerateInvoiceCommand,
        vat_rate: Decimal,
        invoice_number_generator: G,
    ) -> InvoiceGeneratedEvent
    where
        G: Fn(&OrderNumber) -> String,
    {
        let calculate = CalculateVatOperation::new(vat_rate, invoice_number_generator);
        let steps: [&dyn Operation<Invoice>; 2] = [&ValidateInvoiceOperation, &calculate];

        let invoice = run_pipeline(
            Invoice::Unvalidated(UnvalidatedInvoice::from(command)),
            &steps,
        );

        let outcome = if invoice.is_invalid() { "failed" } else { "succeeded" };
        metrics::counter!(
            "workflow_executions_total",
            "workflow" => "billing",
            "outcome" => outcome
        )
        .increment(1);

        InvoiceGeneratedEvent::from_invoice(invoice)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::value_objects::Price;

    #[test]
    fn test_generates_invoice_with_vat() {
        let event = BillingWorkflow::execute(
            GenerateInvoiceCommand::new("ORD-20250101-0001", "Ana", "100.00"),
            Decimal::from_str("0.19").unwrap(),
            |order_number: &OrderNumber| format!("INV-{order_number}-20250101"),
        );

        let InvoiceGeneratedEvent::Succeeded(invoice) = event else {
            panic!("expected Succeeded");
        };
        assert_eq!(invoice.vat_amount, Price::try_parse("19.00").unwrap());
        assert_eq!(invoice.total_with_vat, Price::try_parse("119.00").unwrap());
        assert_eq!(invoice.invoice_number, "INV-ORD-20250101-0001-20250101");
    }

    #[test]
    fn test_invalid_input_fails_without_numbering() {
        let event = BillingWorkflow::execute(
            GenerateInvoiceCommand::new("bad-format", "Ana", "100.00"),
            Decimal::from_str("0.19").unwrap(),
            |_: &OrderNumber| panic!("generator must not run for an invalid invoice"),
        );

        let InvoiceGeneratedEvent::Failed(failure) = event else {
            panic!("expected Failed");
        };
        assert_eq!(failure.reasons, vec!["Invalid order number format".to_string()]);
    }
}
