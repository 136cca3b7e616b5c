use chrono::{DateTime, Utc};
use common::InvoiceGeneratedDto;
use serde::Serialize;

use crate::operation::WorkflowFailure;
use crate::value_objects::{OrderNumber, Price};

use super::state::{GeneratedInvoice, Invoice};

/// Outcome of [`BillingWorkflow`](super::BillingWorkflow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InvoiceGeneratedEvent {
    Succeeded(InvoiceGenerated),
    Failed(WorkflowFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceGenerated {
    pub invoice_number: String,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub total_amount: Price,
    pub vat_amount: Price,
    pub total_with_vat: Price,
    pub generated_at: DateTime<Utc>,
}

impl From<GeneratedInvoice> for InvoiceGenerated {
    fn from(invoice: GeneratedInvoice) -> Self {
        Self {
            invoice_number: invoice.invoice_number,
            order_number: invoice.order_number,
            customer_name: invoice.customer_name,
            total_amount: invoice.total_amount,
            vat_amount: invoice.vat_amount,
            total_with_vat: invoice.total_with_vat,
            generated_at: invoice.generated_at,
        }
    }
}

impl InvoiceGenerated {
    pub fn to_dto(&self) -> InvoiceGeneratedDto {
        InvoiceGeneratedDto {
            invoice_number: self.invoice_number.clone(),
            order_number: self.order_number.to_string(),
            customer_name: self.customer_name.clone(),
            total_amount: self.total_amount.amount(),
            vat_amount: self.vat_amount.amount(),
            total_with_vat: self.total_with_vat.amount(),
            generated_at: self.generated_at,
        }
    }
}

impl InvoiceGeneratedEvent {
    /// Maps any invoice state to an event. Only `Generated` succeeds.
    pub fn from_invoice(invoice: Invoice) -> Self {
        match invoice {
            Invoice::Generated(invoice) => Self::Succeeded(invoice.into()),
            Invoice::Unvalidated(_) => {
                Self::Failed(WorkflowFailure::single("Invoice was not validated"))
            }
            Invoice::Validated(_) => {
                Self::Failed(WorkflowFailure::single("Invoice was not generated"))
            }
            Invoice::Invalid(invalid) => Self::Failed(WorkflowFailure::new(invalid.reasons)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}
