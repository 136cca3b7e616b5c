//! Domain error types.

use thiserror::Error;

/// Format errors raised while constructing a value object from raw input.
///
/// These never escape a workflow: the validating operation catches them and
/// turns them into reasons on the `Invalid` variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The string does not match `ORD-YYYYMMDD-NNNN`.
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),

    /// The string does not match two uppercase letters followed by ten digits.
    #[error("Invalid AWB: {0}")]
    InvalidAwb(String),

    /// The amount is unparseable, negative or overflowed.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// One or more address components are blank.
    #[error("Invalid delivery address: {0}")]
    InvalidDeliveryAddress(String),
}

/// Convenience alias for value object construction.
pub type Result<T> = std::result::Result<T, ValueError>;
