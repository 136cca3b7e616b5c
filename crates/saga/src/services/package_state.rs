//! Package state service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::DeliveryAddressDto;
use domain::{PackageDelivered, PackageShipped};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::SagaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PackageStatus {
    Shipped,
    Delivered,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted view of an order's package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub order_number: String,
    pub tracking_number: String,
    pub status: PackageStatus,
    pub delivery_address: Option<DeliveryAddressDto>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub recipient_name: Option<String>,
}

/// Reads and persists packages, one per order.
#[async_trait]
pub trait PackageStateService: Send + Sync {
    async fn load_package(&self, order_number: &str) -> Result<Option<PackageRecord>, SagaError>;

    async fn save_shipped(&self, package: &PackageShipped) -> Result<(), SagaError>;

    /// Records delivery, keeping shipping details already stored.
    async fn save_delivered(&self, package: &PackageDelivered) -> Result<(), SagaError>;
}

/// In-memory package state service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPackageStateService {
    packages: Arc<RwLock<HashMap<String, PackageRecord>>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryPackageStateService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every save fail until switched off.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    pub async fn package_count(&self) -> usize {
        self.packages.read().await.len()
    }

    fn check_writable(&self) -> Result<(), SagaError> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(SagaError::StateService(
                "package store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PackageStateService for InMemoryPackageStateService {
    async fn load_package(&self, order_number: &str) -> Result<Option<PackageRecord>, SagaError> {
        Ok(self.packages.read().await.get(order_number).cloned())
    }

    #[tracing::instrument(skip(self, package), fields(order_number = %package.order_number))]
    async fn save_shipped(&self, package: &PackageShipped) -> Result<(), SagaError> {
        self.check_writable()?;
        let order_number = package.order_number.to_string();
        let record = PackageRecord {
            order_number: order_number.clone(),
            tracking_number: package.tracking_number.to_string(),
            status: PackageStatus::Shipped,
            delivery_address: Some(package.delivery_address.to_dto()),
            shipped_at: Some(package.shipped_at),
            delivered_at: None,
            recipient_name: None,
        };
        self.packages.write().await.insert(order_number, record);
        Ok(())
    }

    #[tracing::instrument(skip(self, package), fields(order_number = %package.order_number))]
    async fn save_delivered(&self, package: &PackageDelivered) -> Result<(), SagaError> {
        self.check_writable()?;
        let order_number = package.order_number.to_string();
        let mut packages = self.packages.write().await;
        let previous = packages.remove(&order_number);

        let record = PackageRecord {
            order_number: order_number.clone(),
            tracking_number: package.tracking_number.to_string(),
            status: PackageStatus::Delivered,
            delivery_address: previous.as_ref().and_then(|p| p.delivery_address.clone()),
            shipped_at: previous.as_ref().and_then(|p| p.shipped_at),
            delivered_at: Some(package.delivered_at),
            recipient_name: Some(package.recipient_name.clone()),
        };
        packages.insert(order_number, record);
        Ok(())
    }
}
