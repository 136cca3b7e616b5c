//! Invoice lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::operation::Lifecycle;
use crate::value_objects::{OrderNumber, Price};

/// ```text
/// Unvalidated ──► Validated ──► Generated
///      │              │
///      └──────────────┴──► Invalid
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state")]
pub enum Invoice {
    Unvalidated(UnvalidatedInvoice),
    Validated(ValidatedInvoice),
    Generated(GeneratedInvoice),
    Invalid(InvalidInvoice),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnvalidatedInvoice {
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedInvoice {
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub total_amount: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedInvoice {
    pub invoice_number: String,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub total_amount: Price,
    pub vat_amount: Price,
    pub total_with_vat: Price,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidInvoice {
    pub reasons: Vec<String>,
}

impl InvalidInvoice {
    pub fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }

    pub fn single(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
        }
    }
}

impl Lifecycle for Invoice {
    fn kind() -> &'static str {
        "Invoice"
    }

    fn state_name(&self) -> &'static str {
        match self {
            Invoice::Unvalidated(_) => "Unvalidated",
            Invoice::Validated(_) => "Validated",
            Invoice::Generated(_) => "Generated",
            Invoice::Invalid(_) => "Invalid",
        }
    }

    fn is_invalid(&self) -> bool {
        matches!(self, Invoice::Invalid(_))
    }

    fn reasons(&self) -> &[String] {
        match self {
            Invoice::Invalid(invalid) => &invalid.reasons,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Invoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.state_name())
    }
}
