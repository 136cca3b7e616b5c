use async_trait::async_trait;
use chrono::Utc;
use common::{OrderPlacedDto, message_types};
use domain::{BillingWorkflow, GenerateInvoiceCommand, InvoiceGeneratedEvent, OrderNumber};
use messaging::{Envelope, HandlerError, MessageTransport, ProcessingOutcome, TypedHandler};

use crate::SagaConfig;
use crate::handlers::reject;
use crate::services::{
    InvoiceStateService, OrderStateService, OrderStatus, RejectionRecord, SagaStage,
};
use crate::topics;

/// Second stage: bills a placed order.
pub struct BillingHandler<I, O, T> {
    invoices: I,
    orders: O,
    transport: T,
    config: SagaConfig,
}

impl<I, O, T> BillingHandler<I, O, T> {
    pub fn new(invoices: I, orders: O, transport: T, config: SagaConfig) -> Self {
        Self {
            invoices,
            orders,
            transport,
            config,
        }
    }
}

/// `INV-<orderNumber>-<yyyyMMdd>`.
fn invoice_number(order_number: &OrderNumber) -> String {
    format!("INV-{order_number}-{}", Utc::now().format("%Y%m%d"))
}

#[async_trait]
impl<I, O, T> TypedHandler for BillingHandler<I, O, T>
where
    I: InvoiceStateService,
    O: OrderStateService,
    T: MessageTransport,
{
    type Message = OrderPlacedDto;

    const NAME: &'static str = "billing";
    const MESSAGE_TYPE: &'static str = message_types::ORDER_PLACED;

    #[tracing::instrument(
        skip_all,
        fields(order_number = %order.order_number, correlation_id = %envelope.correlation_id)
    )]
    async fn handle_message(
        &self,
        order: OrderPlacedDto,
        envelope: &Envelope,
    ) -> Result<ProcessingOutcome, HandlerError> {
        let order_number = order.order_number.clone();
        let command = GenerateInvoiceCommand::new(
            order.order_number,
            order.customer_name,
            order.total_amount.to_string(),
        );

        let invoice = match BillingWorkflow::execute(command, self.config.vat_rate, invoice_number)
        {
            InvoiceGeneratedEvent::Succeeded(invoice) => invoice,
            InvoiceGeneratedEvent::Failed(failure) => {
                metrics::counter!("invoices_rejected_total").increment(1);
                let rejection = RejectionRecord::new(
                    envelope.correlation_id,
                    SagaStage::Billing,
                    Some(order_number),
                    failure,
                );
                return reject(&self.orders, &self.transport, rejection).await;
            }
        };

        self.invoices.save_invoice(&invoice).await?;
        self.orders
            .mark_order_status(invoice.order_number.value(), OrderStatus::Invoiced)
            .await?;

        self.transport
            .publish(
                topics::INVOICE_EVENTS,
                message_types::INVOICE_GENERATED,
                envelope.correlation_id,
                &invoice.to_dto(),
            )
            .await?;

        tracing::info!(
            invoice_number = %invoice.invoice_number,
            vat_amount = %invoice.vat_amount,
            total_with_vat = %invoice.total_with_vat,
            "invoice generated"
        );
        metrics::counter!("invoices_generated_total").increment(1);
        Ok(ProcessingOutcome::Completed)
    }
}
