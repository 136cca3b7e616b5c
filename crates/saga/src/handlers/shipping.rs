use async_trait::async_trait;
use common::{InvoiceGeneratedDto, message_types};
use domain::{
    Awb, OrderNumber, PickupPackageCommand, ShippingEvent, ShippingWorkflow, WorkflowFailure,
};
use messaging::{Envelope, HandlerError, MessageTransport, ProcessingOutcome, TypedHandler};

use crate::SagaConfig;
use crate::handlers::reject;
use crate::services::{
    OrderRecord, OrderStateService, OrderStatus, PackageStateService, RejectionRecord, SagaStage,
};
use crate::topics;

/// Third stage: ships (and optionally delivers) an invoiced order.
pub struct ShippingHandler<O, P, T> {
    orders: O,
    packages: P,
    transport: T,
    config: SagaConfig,
}

impl<O, P, T> ShippingHandler<O, P, T> {
    pub fn new(orders: O, packages: P, transport: T, config: SagaConfig) -> Self {
        Self {
            orders,
            packages,
            transport,
            config,
        }
    }
}

fn pickup_command(order: &OrderRecord) -> PickupPackageCommand {
    PickupPackageCommand {
        order_number: order.order_number.clone(),
        delivery_street: order.delivery_address.street.clone(),
        delivery_city: order.delivery_address.city.clone(),
        delivery_postal_code: order.delivery_address.postal_code.clone(),
        delivery_country: order.delivery_address.country.clone(),
    }
}

/// Courier hand-over. There is no real courier integration.
fn notify_courier(awb: &Awb) -> bool {
    tracing::info!(tracking_number = %awb, "courier notified");
    true
}

#[async_trait]
impl<O, P, T> TypedHandler for ShippingHandler<O, P, T>
where
    O: OrderStateService,
    P: PackageStateService,
    T: MessageTransport,
{
    type Message = InvoiceGeneratedDto;

    const NAME: &'static str = "shipping";
    const MESSAGE_TYPE: &'static str = message_types::INVOICE_GENERATED;

    #[tracing::instrument(
        skip_all,
        fields(order_number = %invoice.order_number, correlation_id = %envelope.correlation_id)
    )]
    async fn handle_message(
        &self,
        invoice: InvoiceGeneratedDto,
        envelope: &Envelope,
    ) -> Result<ProcessingOutcome, HandlerError> {
        let Some(order) = self.orders.load_order(&invoice.order_number).await? else {
            metrics::counter!("shipments_rejected_total").increment(1);
            let failure =
                WorkflowFailure::single(format!("Order {} not found", invoice.order_number));
            let rejection = RejectionRecord::new(
                envelope.correlation_id,
                SagaStage::Shipping,
                Some(invoice.order_number),
                failure,
            );
            return reject(&self.orders, &self.transport, rejection).await;
        };

        let prefix = self.config.carrier_prefix.as_str();
        let awb_generator = || {
            Awb::generate_with_prefix(prefix)
                .map(String::from)
                .unwrap_or_default()
        };
        let command = pickup_command(&order);

        let event = if self.config.deliver_packages {
            let recipient = order.customer_name.clone();
            ShippingWorkflow::execute_with_delivery(
                command,
                awb_generator,
                notify_courier,
                move |_: &OrderNumber| recipient.clone(),
            )
        } else {
            ShippingWorkflow::execute(command, awb_generator, notify_courier)
        };

        match event {
            ShippingEvent::Shipped(shipped) => {
                self.packages.save_shipped(&shipped).await?;
                self.orders
                    .mark_order_status(shipped.order_number.value(), OrderStatus::Shipped)
                    .await?;
                self.transport
                    .publish(
                        topics::PACKAGE_EVENTS,
                        message_types::PACKAGE_SHIPPED,
                        envelope.correlation_id,
                        &shipped.to_dto(),
                    )
                    .await?;
                tracing::info!(tracking_number = %shipped.tracking_number, "package shipped");
            }
            ShippingEvent::Delivered(delivered) => {
                self.packages.save_delivered(&delivered).await?;
                self.orders
                    .mark_order_status(delivered.order_number.value(), OrderStatus::Delivered)
                    .await?;
                self.transport
                    .publish(
                        topics::PACKAGE_EVENTS,
                        message_types::PACKAGE_DELIVERED,
                        envelope.correlation_id,
                        &delivered.to_dto(),
                    )
                    .await?;
                tracing::info!(
                    tracking_number = %delivered.tracking_number,
                    recipient = %delivered.recipient_name,
                    "package delivered"
                );
            }
            ShippingEvent::Failed(failure) => {
                metrics::counter!("shipments_rejected_total").increment(1);
                let rejection = RejectionRecord::new(
                    envelope.correlation_id,
                    SagaStage::Shipping,
                    Some(order.order_number.clone()),
                    failure,
                );
                return reject(&self.orders, &self.transport, rejection).await;
            }
        }

        metrics::counter!("shipments_total").increment(1);
        Ok(ProcessingOutcome::Completed)
    }
}
