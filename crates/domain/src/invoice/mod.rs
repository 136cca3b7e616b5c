//! Billing: invoice lifecycle, VAT computation and the billing workflow.

mod commands;
mod events;
mod operations;
mod state;
mod workflow;

pub use commands::GenerateInvoiceCommand;
pub use events::{InvoiceGenerated, InvoiceGeneratedEvent};
pub use operations::{CalculateVatOperation, InvoiceOperation, ValidateInvoiceOperation};
pub use state::{GeneratedInvoice, InvalidInvoice, Invoice, UnvalidatedInvoice, ValidatedInvoice};
pub use workflow::BillingWorkflow;
