//! Application configuration loaded from environment variables.

use std::str::FromStr;

use messaging::DEFAULT_MAX_DELIVERY_COUNT;
use rust_decimal::Decimal;
use saga::SagaConfig;

/// Server and saga configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `"0.0.0.0"`)
/// - `PORT`: listen port (default `3000`)
/// - `RUST_LOG`: tracing filter directive (default `"info"`)
/// - `VAT_RATE`: billing VAT rate (default `0.19`)
/// - `CARRIER_PREFIX`: two uppercase letters for tracking numbers (default `"RO"`)
/// - `DELIVER_PACKAGES`: run the delivery step (default `true`)
/// - `MAX_DELIVERY_COUNT`: deliveries before dead-lettering (default `5`)
///
/// A value that is missing or does not parse falls back to its default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub vat_rate: Decimal,
    pub carrier_prefix: String,
    pub deliver_packages: bool,
    pub max_delivery_count: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            vat_rate: lookup("VAT_RATE")
                .and_then(|v| Decimal::from_str(v.trim()).ok())
                .filter(|rate| !rate.is_sign_negative())
                .unwrap_or(defaults.vat_rate),
            carrier_prefix: lookup("CARRIER_PREFIX")
                .filter(|p| p.len() == 2 && p.bytes().all(|b| b.is_ascii_uppercase()))
                .unwrap_or(defaults.carrier_prefix),
            deliver_packages: lookup("DELIVER_PACKAGES")
                .and_then(|v| v.trim().to_ascii_lowercase().parse().ok())
                .unwrap_or(defaults.deliver_packages),
            max_delivery_count: lookup("MAX_DELIVERY_COUNT")
                .and_then(|v| v.parse().ok())
                .filter(|count| *count > 0)
                .unwrap_or(defaults.max_delivery_count),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn saga_config(&self) -> SagaConfig {
        SagaConfig {
            vat_rate: self.vat_rate,
            carrier_prefix: self.carrier_prefix.clone(),
            deliver_packages: self.deliver_packages,
            ..SagaConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let saga = SagaConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            vat_rate: saga.vat_rate,
            carrier_prefix: saga.carrier_prefix,
            deliver_packages: saga.deliver_packages,
            max_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.vat_rate, Decimal::from_str("0.19").unwrap());
        assert_eq!(config.carrier_prefix, "RO");
        assert!(config.deliver_packages);
        assert_eq!(config.max_delivery_count, 5);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_reads_every_variable() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RUST_LOG", "debug"),
            ("VAT_RATE", "0.09"),
            ("CARRIER_PREFIX", "DE"),
            ("DELIVER_PACKAGES", "FALSE"),
            ("MAX_DELIVERY_COUNT", "3"),
        ]);

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.vat_rate, Decimal::from_str("0.09").unwrap());
        assert_eq!(config.carrier_prefix, "DE");
        assert!(!config.deliver_packages);
        assert_eq!(config.max_delivery_count, 3);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_pairs(&[
            ("PORT", "http"),
            ("VAT_RATE", "-0.19"),
            ("CARRIER_PREFIX", "ro"),
            ("DELIVER_PACKAGES", "maybe"),
            ("MAX_DELIVERY_COUNT", "0"),
        ]);
        let defaults = Config::default();

        assert_eq!(config.port, defaults.port);
        assert_eq!(config.vat_rate, defaults.vat_rate);
        assert_eq!(config.carrier_prefix, defaults.carrier_prefix);
        assert_eq!(config.deliver_packages, defaults.deliver_packages);
        assert_eq!(config.max_delivery_count, defaults.max_delivery_count);
    }

    #[test]
    fn test_saga_config_carries_business_settings() {
        let config = from_pairs(&[("VAT_RATE", "0.05"), ("DELIVER_PACKAGES", "false")]);
        let saga = config.saga_config();
        assert_eq!(saga.vat_rate, Decimal::from_str("0.05").unwrap());
        assert!(!saga.deliver_packages);
        assert!(saga.payment_enabled);
    }
}
