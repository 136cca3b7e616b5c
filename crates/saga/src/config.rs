use domain::{DEFAULT_CARRIER_PREFIX, DEFAULT_VAT_RATE};
use rust_decimal::Decimal;

/// Business settings shared by the saga handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaConfig {
    /// VAT rate applied by billing, e.g. `0.19`.
    pub vat_rate: Decimal,
    /// Two-letter carrier prefix for tracking numbers.
    pub carrier_prefix: String,
    /// Run the delivery step after shipping.
    pub deliver_packages: bool,
    /// Run the (stubbed) payment step after confirmation.
    pub payment_enabled: bool,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            vat_rate: DEFAULT_VAT_RATE,
            carrier_prefix: DEFAULT_CARRIER_PREFIX.to_string(),
            deliver_packages: true,
            payment_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SagaConfig::default();
        assert_eq!(config.vat_rate, Decimal::from_str("0.19").unwrap());
        assert_eq!(config.carrier_prefix, "RO");
        assert!(config.deliver_packages);
        assert!(config.payment_enabled);
    }
}
