//! Order state service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CorrelationId, DeliveryAddressDto, OrderPlacedDto};
use domain::OrderPlaced;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::SagaError;
use crate::services::RejectionRecord;

/// Where an order is in the saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderStatus {
    Confirmed,
    Paid,
    Invoiced,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Paid => "Paid",
            Self::Invoiced => "Invoiced",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRecord {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Persisted view of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub delivery_address: DeliveryAddressDto,
    pub lines: Vec<OrderLineRecord>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<&OrderPlaced> for OrderRecord {
    fn from(order: &OrderPlaced) -> Self {
        Self {
            order_number: order.order_number.to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            delivery_address: order.delivery_address.to_dto(),
            lines: order
                .lines
                .iter()
                .map(|line| OrderLineRecord {
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price.amount(),
                })
                .collect(),
            total_amount: order.total_amount.amount(),
            status: if order.paid_at.is_some() {
                OrderStatus::Paid
            } else {
                OrderStatus::Confirmed
            },
            placed_at: order.placed_at,
            paid_at: order.paid_at,
            updated_at: Utc::now(),
        }
    }
}

impl OrderRecord {
    /// Rebuilds the wire event the order was announced with.
    pub fn to_placed_dto(&self) -> OrderPlacedDto {
        OrderPlacedDto {
            order_number: self.order_number.clone(),
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            total_amount: self.total_amount,
            placed_at: self.placed_at,
            paid_at: self.paid_at,
            delivery_address: self.delivery_address.clone(),
        }
    }
}

/// A catalog entry with its remaining stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStock {
    pub name: String,
    pub stock_quantity: u32,
}

/// Reads and persists orders and product stock.
#[async_trait]
pub trait OrderStateService: Send + Sync {
    async fn load_order(&self, order_number: &str) -> Result<Option<OrderRecord>, SagaError>;

    /// Inserts or replaces the order with the same number.
    async fn save_order(&self, order: &OrderPlaced) -> Result<(), SagaError>;

    /// True when the product exists with at least `quantity` in stock.
    async fn check_stock_availability(
        &self,
        product_name: &str,
        quantity: u32,
    ) -> Result<bool, SagaError>;

    /// Deducts sold units. Stock never goes below zero.
    async fn update_stock(&self, product_name: &str, quantity_to_deduct: u32)
    -> Result<(), SagaError>;

    async fn mark_order_status(
        &self,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<(), SagaError>;

    async fn list_products(&self) -> Result<Vec<ProductStock>, SagaError>;

    /// Order placed for the request with this correlation id, if any.
    async fn find_order_by_request(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<OrderRecord>, SagaError>;

    /// Saves the order, deducts stock for every line and remembers which
    /// request placed it, all in one write.
    ///
    /// A second call for a request that already placed an order changes
    /// nothing.
    async fn record_placement(
        &self,
        correlation_id: CorrelationId,
        order: &OrderPlaced,
    ) -> Result<(), SagaError>;

    /// Inserts or replaces the rejection for its correlation id.
    async fn save_rejection(&self, rejection: &RejectionRecord) -> Result<(), SagaError>;

    async fn load_rejection(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<RejectionRecord>, SagaError>;
}

/// Starting catalog for a fresh store.
pub const DEFAULT_CATALOG: &[(&str, u32)] = &[
    ("Laptop", 10),
    ("Mouse", 50),
    ("Keyboard", 30),
    ("Monitor", 15),
    ("Headphones", 25),
];

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<String, OrderRecord>,
    stock: HashMap<String, u32>,
    requests: HashMap<CorrelationId, String>,
    rejections: HashMap<CorrelationId, RejectionRecord>,
}

/// In-memory order state service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStateService {
    state: Arc<RwLock<InMemoryOrderState>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryOrderStateService {
    /// Creates an empty service with no products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service stocked with the given products.
    pub fn with_stock<'a>(products: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let stock = products
            .into_iter()
            .map(|(name, quantity)| (name.to_string(), quantity))
            .collect();
        Self {
            state: Arc::new(RwLock::new(InMemoryOrderState {
                stock,
                ..InMemoryOrderState::default()
            })),
            fail_on_save: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a service stocked with [`DEFAULT_CATALOG`].
    pub fn with_default_catalog() -> Self {
        Self::with_stock(DEFAULT_CATALOG.iter().copied())
    }

    /// Makes every write fail until switched off.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    pub async fn stock_of(&self, product_name: &str) -> Option<u32> {
        self.state.read().await.stock.get(product_name).copied()
    }

    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    fn check_writable(&self) -> Result<(), SagaError> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(SagaError::StateService(
                "order store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStateService for InMemoryOrderStateService {
    async fn load_order(&self, order_number: &str) -> Result<Option<OrderRecord>, SagaError> {
        Ok(self.state.read().await.orders.get(order_number).cloned())
    }

    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn save_order(&self, order: &OrderPlaced) -> Result<(), SagaError> {
        self.check_writable()?;
        let record = OrderRecord::from(order);
        self.state
            .write()
            .await
            .orders
            .insert(record.order_number.clone(), record);
        Ok(())
    }

    async fn check_stock_availability(
        &self,
        product_name: &str,
        quantity: u32,
    ) -> Result<bool, SagaError> {
        Ok(self
            .state
            .read()
            .await
            .stock
            .get(product_name)
            .is_some_and(|available| *available >= quantity))
    }

    async fn update_stock(
        &self,
        product_name: &str,
        quantity_to_deduct: u32,
    ) -> Result<(), SagaError> {
        self.check_writable()?;
        if let Some(available) = self.state.write().await.stock.get_mut(product_name) {
            *available = available.saturating_sub(quantity_to_deduct);
        }
        Ok(())
    }

    async fn mark_order_status(
        &self,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<(), SagaError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(order_number)
            .ok_or_else(|| SagaError::OrderNotFound(order_number.to_string()))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductStock>, SagaError> {
        let mut products: Vec<ProductStock> = self
            .state
            .read()
            .await
            .stock
            .iter()
            .map(|(name, quantity)| ProductStock {
                name: name.clone(),
                stock_quantity: *quantity,
            })
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_order_by_request(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<OrderRecord>, SagaError> {
        let state = self.state.read().await;
        Ok(state
            .requests
            .get(&correlation_id)
            .and_then(|order_number| state.orders.get(order_number))
            .cloned())
    }

    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn record_placement(
        &self,
        correlation_id: CorrelationId,
        order: &OrderPlaced,
    ) -> Result<(), SagaError> {
        self.check_writable()?;
        let record = OrderRecord::from(order);
        let mut state = self.state.write().await;
        if state.requests.contains_key(&correlation_id) {
            tracing::debug!(%correlation_id, "placement already recorded");
            return Ok(());
        }
        for line in &record.lines {
            if let Some(available) = state.stock.get_mut(&line.product_name) {
                *available = available.saturating_sub(line.quantity);
            }
        }
        state
            .requests
            .insert(correlation_id, record.order_number.clone());
        state.orders.insert(record.order_number.clone(), record);
        Ok(())
    }

    async fn save_rejection(&self, rejection: &RejectionRecord) -> Result<(), SagaError> {
        self.check_writable()?;
        self.state
            .write()
            .await
            .rejections
            .insert(rejection.correlation_id, rejection.clone());
        Ok(())
    }

    async fn load_rejection(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<RejectionRecord>, SagaError> {
        Ok(self
            .state
            .read()
            .await
            .rejections
            .get(&correlation_id)
            .cloned())
    }
}
