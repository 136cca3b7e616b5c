//! Value objects shared by the order, invoice and package lifecycles.
//!
//! Each type can only be obtained through a validating factory, so holding
//! one is proof that its format invariant holds.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use common::DeliveryAddressDto;
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValueError};

/// Carrier prefix used by [`Awb::generate`].
pub const DEFAULT_CARRIER_PREFIX: &str = "RO";

/// Order number in the form `ORD-YYYYMMDD-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Parses a raw order number, rejecting anything off-pattern.
    pub fn try_parse(raw: &str) -> Result<Self> {
        if is_order_number(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValueError::InvalidOrderNumber(raw.to_string()))
        }
    }

    /// Generates a fresh order number stamped with today's date and a random suffix.
    pub fn generate() -> Self {
        let suffix = rand::thread_rng().gen_range(0..10_000);
        Self::generate_for(Utc::now().date_naive(), suffix)
    }

    /// Builds an order number for a given date and sequence suffix.
    ///
    /// Suffixes above 9999 wrap so the result always has four digits.
    pub fn generate_for(date: NaiveDate, suffix: u16) -> Self {
        Self(format!("ORD-{}-{:04}", date.format("%Y%m%d"), suffix % 10_000))
    }

    /// Returns the order number as a string slice.
    pub fn value(&self) -> &str {
        &self.0
    }
}

fn is_order_number(raw: &str) -> bool {
    let Some(rest) = raw.strip_prefix("ORD-") else {
        return false;
    };
    let Some((date, sequence)) = rest.split_once('-') else {
        return false;
    };

    date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && sequence.len() == 4
        && sequence.bytes().all(|b| b.is_ascii_digit())
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

/// Air waybill (courier tracking number): two uppercase letters and ten digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Awb(String);

impl Awb {
    /// Parses a raw tracking number.
    pub fn try_parse(raw: &str) -> Result<Self> {
        if is_awb(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValueError::InvalidAwb(raw.to_string()))
        }
    }

    /// Generates a tracking number for the default carrier.
    pub fn generate() -> Self {
        Self(format!(
            "{DEFAULT_CARRIER_PREFIX}{}",
            Utc::now().format("%y%m%d%H%M")
        ))
    }

    /// Generates a tracking number for the given carrier prefix.
    ///
    /// The ten digits are the current UTC time as `yyMMddHHmm`.
    pub fn generate_with_prefix(prefix: &str) -> Result<Self> {
        Self::try_parse(&format!("{prefix}{}", Utc::now().format("%y%m%d%H%M")))
    }

    /// Returns the tracking number as a string slice.
    pub fn value(&self) -> &str {
        &self.0
    }
}

fn is_awb(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 12
        && bytes[..2].iter().all(|b| b.is_ascii_uppercase())
        && bytes[2..].iter().all(|b| b.is_ascii_digit())
}

impl std::fmt::Display for Awb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Awb {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_parse(&value)
    }
}

impl From<Awb> for String {
    fn from(awb: Awb) -> Self {
        awb.0
    }
}

/// Non-negative monetary amount.
///
/// Arithmetic is checked: any operation that would overflow or go negative
/// fails with [`ValueError::InvalidPrice`] instead of producing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Wraps an amount, rejecting negatives.
    pub fn new(amount: Decimal) -> Result<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValueError::InvalidPrice(format!(
                "amount cannot be negative: {amount}"
            )));
        }
        Ok(Self(amount))
    }

    /// Parses a decimal string such as `"12.50"`.
    pub fn try_parse(raw: &str) -> Result<Self> {
        let amount = Decimal::from_str(raw.trim())
            .map_err(|_| ValueError::InvalidPrice(format!("not a decimal: {raw}")))?;
        Self::new(amount)
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the underlying amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Adds two prices.
    pub fn checked_add(&self, other: Price) -> Result<Price> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| ValueError::InvalidPrice("addition overflowed".to_string()))?;
        Self::new(sum)
    }

    /// Multiplies by a line quantity.
    pub fn multiply(&self, quantity: u32) -> Result<Price> {
        let product = self
            .0
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| ValueError::InvalidPrice("multiplication overflowed".to_string()))?;
        Self::new(product)
    }

    /// VAT owed on this amount at `rate`, rounded to cents half away from zero.
    pub fn vat(&self, rate: Decimal) -> Result<Price> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(ValueError::InvalidPrice(format!(
                "VAT rate cannot be negative: {rate}"
            )));
        }
        let raw = self
            .0
            .checked_mul(rate)
            .ok_or_else(|| ValueError::InvalidPrice("VAT computation overflowed".to_string()))?;
        Self::new(raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValueError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// Where a package goes. All four components are required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeliveryAddress {
    street: String,
    city: String,
    postal_code: String,
    country: String,
}

impl DeliveryAddress {
    /// Builds an address, trimming each component and rejecting blanks.
    pub fn try_new(street: &str, city: &str, postal_code: &str, country: &str) -> Result<Self> {
        let missing: Vec<&str> = [
            ("street", street),
            ("city", city),
            ("postal code", postal_code),
            ("country", country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ValueError::InvalidDeliveryAddress(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            street: street.trim().to_string(),
            city: city.trim().to_string(),
            postal_code: postal_code.trim().to_string(),
            country: country.trim().to_string(),
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Flattens the address into its wire shape.
    pub fn to_dto(&self) -> DeliveryAddressDto {
        DeliveryAddressDto {
            street: self.street.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

impl std::fmt::Display for DeliveryAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.street, self.city, self.postal_code, self.country
        )
    }
}
