//! End-to-end runs of the order fulfillment saga over the in-memory
//! transport and state services.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use common::{InvoiceGeneratedDto, message_types};
use domain::{OrderItemCommand, PlaceOrderCommand};
use messaging::{CorrelationId, InMemoryTransport, MessageTransport};
use rust_decimal::Decimal;
use saga::{
    InMemoryInvoiceStateService, InMemoryOrderStateService, InMemoryPackageStateService,
    InvoiceStateService, OrderStateService, OrderStatus, PackageStateService, PackageStatus,
    SagaConfig, SagaCoordinator, SagaHandle, SagaStage, topics,
};

type TestCoordinator = SagaCoordinator<
    InMemoryTransport,
    InMemoryOrderStateService,
    InMemoryInvoiceStateService,
    InMemoryPackageStateService,
>;

struct TestHarness {
    coordinator: TestCoordinator,
    handle: SagaHandle,
    transport: InMemoryTransport,
    orders: InMemoryOrderStateService,
    invoices: InMemoryInvoiceStateService,
    packages: InMemoryPackageStateService,
}

impl TestHarness {
    async fn start() -> Self {
        Self::start_with(InMemoryTransport::new(), SagaConfig::default()).await
    }

    async fn start_with(transport: InMemoryTransport, config: SagaConfig) -> Self {
        let transport = transport.with_history();
        let orders = InMemoryOrderStateService::with_default_catalog();
        let invoices = InMemoryInvoiceStateService::new();
        let packages = InMemoryPackageStateService::new();

        let coordinator = SagaCoordinator::new(
            transport.clone(),
            orders.clone(),
            invoices.clone(),
            packages.clone(),
            config,
        );
        let handle = coordinator.start().await.unwrap();

        Self {
            coordinator,
            handle,
            transport,
            orders,
            invoices,
            packages,
        }
    }
}

fn order_command(items: Vec<OrderItemCommand>) -> PlaceOrderCommand {
    PlaceOrderCommand {
        customer_name: "Ana Popescu".to_string(),
        customer_email: "ana@example.com".to_string(),
        delivery_street: "Str. Lalelelor 1".to_string(),
        delivery_city: "Timisoara".to_string(),
        delivery_postal_code: "300001".to_string(),
        delivery_country: "RO".to_string(),
        items,
    }
}

/// Polls `condition` until it holds or two seconds have passed.
async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

#[tokio::test]
async fn test_happy_path_runs_every_stage() {
    let h = TestHarness::start().await;

    let correlation_id = h
        .coordinator
        .place_order(order_command(vec![
            OrderItemCommand::new("Laptop", "2", "3499.99"),
            OrderItemCommand::new("Mouse", "1", "49.90"),
        ]))
        .await
        .unwrap();

    let transport = &h.transport;
    eventually(|| async move {
        transport.published(topics::PACKAGE_EVENTS).await.len() == 1
    })
    .await;

    // Every hop carries the correlation id of the command.
    for topic in [
        topics::ORDER_EVENTS,
        topics::INVOICE_EVENTS,
        topics::PACKAGE_EVENTS,
    ] {
        let published = h.transport.published(topic).await;
        assert_eq!(published.len(), 1, "{topic}");
        assert_eq!(published[0].correlation_id, correlation_id, "{topic}");
    }

    let placed = &h.transport.published(topics::ORDER_EVENTS).await[0];
    assert_eq!(placed.message_type, message_types::ORDER_PLACED);
    let order_number = placed.payload["orderNumber"].as_str().unwrap().to_string();

    let delivered = &h.transport.published(topics::PACKAGE_EVENTS).await[0];
    assert_eq!(delivered.message_type, message_types::PACKAGE_DELIVERED);
    assert_eq!(delivered.payload["orderNumber"], order_number.as_str());
    assert_eq!(delivered.payload["recipientName"], "Ana Popescu");

    let order = h.orders.load_order(&order_number).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.total_amount, Decimal::from_str("7049.88").unwrap());
    assert!(order.paid_at.is_some());

    let invoice = h.invoices.load_invoice(&order_number).await.unwrap().unwrap();
    assert_eq!(invoice.vat_amount, Decimal::from_str("1339.48").unwrap());
    assert_eq!(invoice.total_with_vat, Decimal::from_str("8389.36").unwrap());
    assert!(invoice.invoice_number.starts_with(&format!("INV-{order_number}-")));

    let package = h.packages.load_package(&order_number).await.unwrap().unwrap();
    assert_eq!(package.status, PackageStatus::Delivered);
    assert!(package.tracking_number.starts_with("RO"));
    assert!(package.shipped_at.is_some());
    assert_eq!(package.recipient_name.as_deref(), Some("Ana Popescu"));

    assert_eq!(h.orders.stock_of("Laptop").await, Some(8));
    assert_eq!(h.orders.stock_of("Mouse").await, Some(49));
    assert!(h.transport.dead_letters().await.is_empty());

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shipping_without_delivery_stops_at_shipped() {
    let config = SagaConfig {
        deliver_packages: false,
        ..SagaConfig::default()
    };
    let h = TestHarness::start_with(InMemoryTransport::new(), config).await;

    h.coordinator
        .place_order(order_command(vec![OrderItemCommand::new(
            "Keyboard", "1", "199.00",
        )]))
        .await
        .unwrap();

    let transport = &h.transport;
    eventually(|| async move {
        transport.published(topics::PACKAGE_EVENTS).await.len() == 1
    })
    .await;

    let shipped = &h.transport.published(topics::PACKAGE_EVENTS).await[0];
    assert_eq!(shipped.message_type, message_types::PACKAGE_SHIPPED);
    let order_number = shipped.payload["orderNumber"].as_str().unwrap();

    let package = h.packages.load_package(order_number).await.unwrap().unwrap();
    assert_eq!(package.status, PackageStatus::Shipped);
    assert!(package.delivered_at.is_none());

    let order = h.orders.load_order(order_number).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_order_is_completed_without_retry() {
    let h = TestHarness::start().await;

    let mut command = order_command(vec![OrderItemCommand::new("Laptop", "1", "3499.99")]);
    command.customer_email = "not-an-email".to_string();
    let correlation_id = h.coordinator.place_order(command).await.unwrap();

    let transport = &h.transport;
    eventually(|| async move { transport.completed_count() == 2 }).await;

    let rejection = h.orders.load_rejection(correlation_id).await.unwrap().unwrap();
    assert_eq!(rejection.stage, SagaStage::OrderPlacement);
    assert!(rejection.order_number.is_none());
    assert!(
        rejection
            .failure
            .reasons
            .contains(&"Customer email must contain '@'".to_string())
    );

    let failures = h.transport.published(topics::SAGA_FAILURES).await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].message_type, message_types::SAGA_FAILED);
    assert_eq!(failures[0].correlation_id, correlation_id);
    assert_eq!(failures[0].payload["success"], false);
    assert_eq!(failures[0].payload["stage"], "order_placement");

    assert!(h.transport.published(topics::ORDER_EVENTS).await.is_empty());
    assert!(h.transport.dead_letters().await.is_empty());
    assert_eq!(h.orders.order_count().await, 0);
    assert_eq!(h.orders.stock_of("Laptop").await, Some(10));

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_insufficient_stock_rejects_order() {
    let h = TestHarness::start().await;

    let correlation_id = h
        .coordinator
        .place_order(order_command(vec![
            OrderItemCommand::new("Monitor", "100", "899.00"),
            OrderItemCommand::new("Mouse", "1", "49.90"),
        ]))
        .await
        .unwrap();

    let orders = &h.orders;
    eventually(|| async move {
        orders.load_rejection(correlation_id).await.unwrap().is_some()
    })
    .await;

    let rejection = h.orders.load_rejection(correlation_id).await.unwrap().unwrap();
    assert_eq!(
        rejection.failure.reasons,
        vec!["Insufficient stock for Monitor".to_string()]
    );
    assert!(h.transport.published(topics::ORDER_EVENTS).await.is_empty());
    assert_eq!(h.orders.stock_of("Monitor").await, Some(15));
    assert_eq!(h.orders.stock_of("Mouse").await, Some(50));

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_state_failure_is_redelivered_then_dead_lettered() {
    let transport = InMemoryTransport::with_max_delivery_count(3);
    let h = TestHarness::start_with(transport, SagaConfig::default()).await;
    h.orders.set_fail_on_save(true);

    h.coordinator
        .place_order(order_command(vec![OrderItemCommand::new("Mouse", "2", "49.90")]))
        .await
        .unwrap();

    let transport = &h.transport;
    eventually(|| async move { !transport.dead_letters().await.is_empty() }).await;

    let dead = h.transport.dead_letters().await;
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].subscription, topics::ORDER_PROCESSOR_SUBSCRIPTION);
    assert_eq!(dead[0].envelope.delivery_count, 3);
    assert!(h.transport.published(topics::ORDER_EVENTS).await.is_empty());
    assert_eq!(h.orders.stock_of("Mouse").await, Some(50));
    assert_eq!(h.orders.order_count().await, 0);

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_billing_failure_leaves_order_placed() {
    let transport = InMemoryTransport::with_max_delivery_count(2);
    let h = TestHarness::start_with(transport, SagaConfig::default()).await;
    h.invoices.set_fail_on_save(true);

    h.coordinator
        .place_order(order_command(vec![OrderItemCommand::new("Headphones", "1", "299.00")]))
        .await
        .unwrap();

    let transport = &h.transport;
    eventually(|| async move { !transport.dead_letters().await.is_empty() }).await;

    let dead = h.transport.dead_letters().await;
    assert_eq!(dead[0].subscription, topics::BILLING_SUBSCRIPTION);
    assert!(h.transport.published(topics::INVOICE_EVENTS).await.is_empty());

    let order_number = dead[0].envelope.payload["orderNumber"].as_str().unwrap();
    let order = h.orders.load_order(order_number).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(h.invoices.invoice_count().await, 0);

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invoice_for_unknown_order_is_rejected() {
    let h = TestHarness::start().await;

    let invoice = InvoiceGeneratedDto {
        invoice_number: "INV-ORD-20250101-0001-20250101".to_string(),
        order_number: "ORD-20250101-0001".to_string(),
        customer_name: "Ana Popescu".to_string(),
        total_amount: Decimal::from(100),
        vat_amount: Decimal::from(19),
        total_with_vat: Decimal::from(119),
        generated_at: Utc::now(),
    };
    let correlation_id = CorrelationId::new();
    h.transport
        .publish(
            topics::INVOICE_EVENTS,
            message_types::INVOICE_GENERATED,
            correlation_id,
            &invoice,
        )
        .await
        .unwrap();

    let transport = &h.transport;
    eventually(|| async move { transport.completed_count() == 2 }).await;

    let rejection = h.orders.load_rejection(correlation_id).await.unwrap().unwrap();
    assert_eq!(rejection.stage, SagaStage::Shipping);
    assert_eq!(rejection.order_number.as_deref(), Some("ORD-20250101-0001"));
    assert_eq!(
        rejection.failure.reasons,
        vec!["Order ORD-20250101-0001 not found".to_string()]
    );
    assert_eq!(h.transport.published(topics::SAGA_FAILURES).await.len(), 1);
    assert!(h.transport.published(topics::PACKAGE_EVENTS).await.is_empty());
    assert!(h.transport.dead_letters().await.is_empty());
    assert_eq!(h.packages.package_count().await, 0);

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_message_type_is_dead_lettered() {
    let h = TestHarness::start().await;

    h.transport
        .publish(
            topics::ORDER_COMMANDS,
            "CancelOrderCommand",
            CorrelationId::new(),
            &serde_json::json!({ "orderNumber": "ORD-20250101-0001" }),
        )
        .await
        .unwrap();

    let transport = &h.transport;
    eventually(|| async move { !transport.dead_letters().await.is_empty() }).await;

    let dead = h.transport.dead_letters().await;
    assert_eq!(dead[0].reason, "Unknown message type CancelOrderCommand");
    assert_eq!(dead[0].envelope.delivery_count, 1);

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_orders_are_processed_independently() {
    let h = TestHarness::start().await;

    let first = h
        .coordinator
        .place_order(order_command(vec![OrderItemCommand::new("Mouse", "1", "49.90")]))
        .await
        .unwrap();
    let second = h
        .coordinator
        .place_order(order_command(vec![OrderItemCommand::new("Keyboard", "2", "199.00")]))
        .await
        .unwrap();
    assert_ne!(first, second);

    let transport = &h.transport;
    eventually(|| async move {
        transport.published(topics::PACKAGE_EVENTS).await.len() == 2
    })
    .await;

    let correlations: Vec<CorrelationId> = h
        .transport
        .published(topics::PACKAGE_EVENTS)
        .await
        .iter()
        .map(|e| e.correlation_id)
        .collect();
    assert!(correlations.contains(&first));
    assert!(correlations.contains(&second));
    assert_eq!(h.orders.order_count().await, 2);

    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_consuming() {
    let h = TestHarness::start().await;
    assert_eq!(h.handle.subscriptions().len(), 5);

    h.handle.shutdown().await.unwrap();
    // A second call is a no-op.
    h.handle.shutdown().await.unwrap();

    h.coordinator
        .place_order(order_command(vec![OrderItemCommand::new("Mouse", "1", "49.90")]))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.transport.completed_count(), 0);
    assert_eq!(h.orders.order_count().await, 0);
}
