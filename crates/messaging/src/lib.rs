//! Messaging layer for the order fulfillment saga.
//!
//! - [`Envelope`]: a JSON payload plus routing and correlation metadata
//! - [`MessageTransport`] / [`Subscription`]: at-least-once pub/sub with
//!   explicit settlement (complete, abandon, dead-letter)
//! - [`InMemoryTransport`]: the transport used in-process and in tests
//! - [`MessageHandler`] / [`TypedHandler`]: what a consumer calls per message
//! - [`spawn_consumer`]: one sequential consumer loop per subscription

pub mod consumer;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod memory;
pub mod transport;

pub use common::CorrelationId;
pub use consumer::{ConsumerHandle, spawn_consumer};
pub use envelope::{Envelope, EnvelopeBuilder, MessageId};
pub use error::{HandlerError, MessagingError, Result};
pub use handler::{MessageHandler, ProcessingOutcome, TypedAdapter, TypedHandler, typed};
pub use memory::{DEFAULT_MAX_DELIVERY_COUNT, DeadLetter, InMemoryTransport, InMemorySubscription};
pub use transport::{MessageTransport, Subscription};
