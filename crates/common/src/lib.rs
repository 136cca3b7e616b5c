//! Shared types for the order fulfillment saga.
//!
//! Everything in this crate crosses process boundaries: the correlation id
//! that ties the three saga stages together and the flat DTOs published on
//! the message bus. Domain value objects never appear here.

pub mod dto;
pub mod types;

pub use dto::{
    DeliveryAddressDto, InvoiceGeneratedDto, OrderPlacedDto, PackageDeliveredDto,
    PackageShippedDto, SagaFailedDto, message_types,
};
pub use types::CorrelationId;
