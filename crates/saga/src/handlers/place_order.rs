use std::collections::HashMap;

use async_trait::async_trait;
use common::{OrderPlacedDto, message_types};
use domain::{OrderNumber, OrderPlacedEvent, OrderProcessingWorkflow, PlaceOrderCommand, Price};
use messaging::{Envelope, HandlerError, MessageTransport, ProcessingOutcome, TypedHandler};

use crate::SagaConfig;
use crate::handlers::reject;
use crate::services::{OrderStateService, RejectionRecord, SagaStage};
use crate::topics;

/// First stage: turns a `PlaceOrderCommand` into a placed order.
///
/// Placement is keyed by the envelope's correlation id. A redelivered
/// command whose order is already stored republishes that order instead of
/// placing a second one.
pub struct PlaceOrderHandler<O, T> {
    orders: O,
    transport: T,
    config: SagaConfig,
}

impl<O, T> PlaceOrderHandler<O, T>
where
    O: OrderStateService,
    T: MessageTransport,
{
    pub fn new(orders: O, transport: T, config: SagaConfig) -> Self {
        Self {
            orders,
            transport,
            config,
        }
    }

    /// Looks up stock for every line the validator will ask about.
    async fn prefetch_stock(
        &self,
        command: &PlaceOrderCommand,
    ) -> Result<HashMap<(String, u32), bool>, HandlerError> {
        let mut stock = HashMap::new();
        for item in &command.items {
            let name = item.product_name.trim();
            let Ok(quantity) = item.quantity.trim().parse::<u32>() else {
                continue;
            };
            if name.is_empty() || quantity == 0 {
                continue;
            }
            let available = self
                .orders
                .check_stock_availability(name, quantity)
                .await?;
            stock.insert((name.to_string(), quantity), available);
        }
        Ok(stock)
    }

    async fn publish_placed(
        &self,
        order: &OrderPlacedDto,
        envelope: &Envelope,
    ) -> Result<(), HandlerError> {
        self.transport
            .publish(
                topics::ORDER_EVENTS,
                message_types::ORDER_PLACED,
                envelope.correlation_id,
                order,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<O, T> TypedHandler for PlaceOrderHandler<O, T>
where
    O: OrderStateService,
    T: MessageTransport,
{
    type Message = PlaceOrderCommand;

    const NAME: &'static str = "place_order";
    const MESSAGE_TYPE: &'static str = message_types::PLACE_ORDER_COMMAND;

    #[tracing::instrument(skip_all, fields(correlation_id = %envelope.correlation_id))]
    async fn handle_message(
        &self,
        command: PlaceOrderCommand,
        envelope: &Envelope,
    ) -> Result<ProcessingOutcome, HandlerError> {
        if let Some(existing) = self
            .orders
            .find_order_by_request(envelope.correlation_id)
            .await?
        {
            tracing::info!(
                order_number = %existing.order_number,
                delivery_count = envelope.delivery_count,
                "order already placed for this request"
            );
            self.publish_placed(&existing.to_placed_dto(), envelope).await?;
            return Ok(ProcessingOutcome::Completed);
        }

        let stock = self.prefetch_stock(&command).await?;
        let stock_check = |product: &str, quantity: u32| {
            stock
                .get(&(product.to_string(), quantity))
                .copied()
                .unwrap_or(false)
        };
        let order_number_generator = || OrderNumber::generate().to_string();

        let event = if self.config.payment_enabled {
            OrderProcessingWorkflow::execute_with_payment(
                command,
                stock_check,
                order_number_generator,
                |order_number: &OrderNumber, amount: Price| {
                    tracing::debug!(%order_number, %amount, "payment confirmed");
                    true
                },
            )
        } else {
            OrderProcessingWorkflow::execute(command, stock_check, order_number_generator)
        };

        let placed = match event {
            OrderPlacedEvent::Succeeded(placed) => placed,
            OrderPlacedEvent::Failed(failure) => {
                metrics::counter!("orders_rejected_total").increment(1);
                let rejection = RejectionRecord::new(
                    envelope.correlation_id,
                    SagaStage::OrderPlacement,
                    None,
                    failure,
                );
                return reject(&self.orders, &self.transport, rejection).await;
            }
        };

        self.orders
            .record_placement(envelope.correlation_id, &placed)
            .await?;
        self.publish_placed(&placed.to_dto(), envelope).await?;

        tracing::info!(
            order_number = %placed.order_number,
            total_amount = %placed.total_amount,
            "order placed"
        );
        metrics::counter!("orders_placed_total").increment(1);
        Ok(ProcessingOutcome::Completed)
    }
}
