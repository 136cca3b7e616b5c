//! Wires the saga handlers to their subscriptions.

use std::sync::Arc;

use common::message_types;
use domain::PlaceOrderCommand;
use futures_util::future::join_all;
use messaging::{
    ConsumerHandle, CorrelationId, MessageHandler, MessageTransport, spawn_consumer, typed,
};

use crate::config::SagaConfig;
use crate::error::SagaError;
use crate::handlers::{
    BillingHandler, FailureTrackingHandler, PackageTrackingHandler, PlaceOrderHandler,
    ShippingHandler,
};
use crate::services::{InvoiceStateService, OrderStateService, PackageStateService};
use crate::topics;

/// Runs the order fulfillment saga over a message transport.
///
/// Stages are chained only through messages:
/// `PlaceOrderCommand` → `OrderPlacedDto` → `InvoiceGeneratedDto` →
/// `PackageShippedDto`/`PackageDeliveredDto`. Rejections from any stage go
/// to `saga-failures`. The coordinator owns the services so each stage can
/// be given its own clone.
pub struct SagaCoordinator<T, O, I, P> {
    transport: T,
    orders: O,
    invoices: I,
    packages: P,
    config: SagaConfig,
}

impl<T, O, I, P> SagaCoordinator<T, O, I, P>
where
    T: MessageTransport + Clone + 'static,
    O: OrderStateService + Clone + 'static,
    I: InvoiceStateService + Clone + 'static,
    P: PackageStateService + Clone + 'static,
{
    pub fn new(transport: T, orders: O, invoices: I, packages: P, config: SagaConfig) -> Self {
        Self {
            transport,
            orders,
            invoices,
            packages,
            config,
        }
    }

    /// Subscribes every stage and starts its consumer loop.
    ///
    /// Call this before [`place_order`](Self::place_order): messages sent to
    /// a topic with no subscription are dropped.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self) -> Result<SagaHandle, SagaError> {
        let place_order = PlaceOrderHandler::new(
            self.orders.clone(),
            self.transport.clone(),
            self.config.clone(),
        );
        let billing = BillingHandler::new(
            self.invoices.clone(),
            self.orders.clone(),
            self.transport.clone(),
            self.config.clone(),
        );
        let shipping = ShippingHandler::new(
            self.orders.clone(),
            self.packages.clone(),
            self.transport.clone(),
            self.config.clone(),
        );

        let stages = [
            (
                topics::ORDER_COMMANDS,
                topics::ORDER_PROCESSOR_SUBSCRIPTION,
                typed(place_order),
            ),
            (topics::ORDER_EVENTS, topics::BILLING_SUBSCRIPTION, typed(billing)),
            (
                topics::INVOICE_EVENTS,
                topics::SHIPPING_SUBSCRIPTION,
                typed(shipping),
            ),
            (
                topics::PACKAGE_EVENTS,
                topics::ORDER_TRACKING_SUBSCRIPTION,
                Arc::new(PackageTrackingHandler) as Arc<dyn MessageHandler>,
            ),
            (
                topics::SAGA_FAILURES,
                topics::ORDER_TRACKING_SUBSCRIPTION,
                typed(FailureTrackingHandler),
            ),
        ];

        let mut consumers = Vec::with_capacity(stages.len());
        for (topic, subscription, handler) in stages {
            let receiver = self.transport.subscribe(topic, subscription).await?;
            consumers.push(spawn_consumer(receiver, handler));
        }

        tracing::info!(consumers = consumers.len(), "saga started");
        Ok(SagaHandle { consumers })
    }

    /// Publishes a `PlaceOrderCommand` and returns the correlation id that
    /// every downstream event will carry.
    #[tracing::instrument(skip(self, command), fields(customer = %command.customer_name))]
    pub async fn place_order(
        &self,
        command: PlaceOrderCommand,
    ) -> Result<CorrelationId, SagaError> {
        let correlation_id = CorrelationId::new();
        self.transport
            .publish(
                topics::ORDER_COMMANDS,
                message_types::PLACE_ORDER_COMMAND,
                correlation_id,
                &command,
            )
            .await?;
        metrics::counter!("orders_submitted_total").increment(1);
        tracing::info!(%correlation_id, "order submitted");
        Ok(correlation_id)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    pub fn invoices(&self) -> &I {
        &self.invoices
    }

    pub fn packages(&self) -> &P {
        &self.packages
    }

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }
}

/// The running consumers of a started saga.
pub struct SagaHandle {
    consumers: Vec<ConsumerHandle>,
}

impl SagaHandle {
    /// Stops every consumer, letting in-flight messages finish.
    pub async fn shutdown(&self) -> Result<(), SagaError> {
        let results = join_all(self.consumers.iter().map(ConsumerHandle::shutdown)).await;
        for result in results {
            result?;
        }
        tracing::info!("saga stopped");
        Ok(())
    }

    /// Consumers as `(topic, subscription)` pairs.
    pub fn subscriptions(&self) -> Vec<(&str, &str)> {
        self.consumers
            .iter()
            .map(|c| (c.topic(), c.subscription()))
            .collect()
    }
}
