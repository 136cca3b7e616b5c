//! Invoice state service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::InvoiceGenerated;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::SagaError;

/// Persisted view of a generated invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub vat_amount: Decimal,
    pub total_with_vat: Decimal,
    pub generated_at: DateTime<Utc>,
}

impl From<&InvoiceGenerated> for InvoiceRecord {
    fn from(invoice: &InvoiceGenerated) -> Self {
        Self {
            invoice_number: invoice.invoice_number.clone(),
            order_number: invoice.order_number.to_string(),
            customer_name: invoice.customer_name.clone(),
            total_amount: invoice.total_amount.amount(),
            vat_amount: invoice.vat_amount.amount(),
            total_with_vat: invoice.total_with_vat.amount(),
            generated_at: invoice.generated_at,
        }
    }
}

/// Reads and persists invoices, one per order.
#[async_trait]
pub trait InvoiceStateService: Send + Sync {
    async fn load_invoice(&self, order_number: &str) -> Result<Option<InvoiceRecord>, SagaError>;

    /// Inserts or replaces the invoice for the order.
    async fn save_invoice(&self, invoice: &InvoiceGenerated) -> Result<(), SagaError>;
}

/// In-memory invoice state service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInvoiceStateService {
    invoices: Arc<RwLock<HashMap<String, InvoiceRecord>>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryInvoiceStateService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every save fail until switched off.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    pub async fn invoice_count(&self) -> usize {
        self.invoices.read().await.len()
    }
}

#[async_trait]
impl InvoiceStateService for InMemoryInvoiceStateService {
    async fn load_invoice(&self, order_number: &str) -> Result<Option<InvoiceRecord>, SagaError> {
        Ok(self.invoices.read().await.get(order_number).cloned())
    }

    #[tracing::instrument(skip(self, invoice), fields(order_number = %invoice.order_number))]
    async fn save_invoice(&self, invoice: &InvoiceGenerated) -> Result<(), SagaError> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(SagaError::StateService(
                "invoice store unavailable".to_string(),
            ));
        }
        let record = InvoiceRecord::from(invoice);
        self.invoices
            .write()
            .await
            .insert(record.order_number.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::{BillingWorkflow, DEFAULT_VAT_RATE, GenerateInvoiceCommand, InvoiceGeneratedEvent};

    use super::*;

    fn generated(invoice_number: &str) -> InvoiceGenerated {
        let number = invoice_number.to_string();
        match BillingWorkflow::execute(
            GenerateInvoiceCommand::new("ORD-20250101-0001", "Ana", "100.00"),
            DEFAULT_VAT_RATE,
            move |_: &domain::OrderNumber| number.clone(),
        ) {
            InvoiceGeneratedEvent::Succeeded(invoice) => invoice,
            InvoiceGeneratedEvent::Failed(failure) => panic!("{failure}"),
        }
    }

    #[tokio::test]
    async fn test_save_replaces_invoice_for_same_order() {
        let service = InMemoryInvoiceStateService::new();
        service.save_invoice(&generated("INV-1")).await.unwrap();
        service.save_invoice(&generated("INV-2")).await.unwrap();

        assert_eq!(service.invoice_count().await, 1);
        let record = service
            .load_invoice("ORD-20250101-0001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.invoice_number, "INV-2");
        assert_eq!(record.total_with_vat.to_string(), "119.00");
    }

    #[tokio::test]
    async fn test_fail_on_save() {
        let service = InMemoryInvoiceStateService::new();
        service.set_fail_on_save(true);
        assert!(matches!(
            service.save_invoice(&generated("INV-1")).await,
            Err(SagaError::StateService(_))
        ));
        assert!(service.load_invoice("ORD-20250101-0001").await.unwrap().is_none());
    }
}
