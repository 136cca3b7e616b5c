//! Order placement: lifecycle, operations, events and the workflow tying
//! them together.

mod commands;
mod events;
mod operations;
mod state;
mod workflow;

pub use commands::*;
pub use events::{OrderPlaced, OrderPlacedEvent};
pub use operations::{
    ConfirmOrderOperation, OrderOperation, PayOrderOperation, ValidateOrderOperation,
};
pub use state::{
    ConfirmedOrder, InvalidOrder, Order, OrderLine, PaidOrder, UnvalidatedOrder,
    UnvalidatedOrderLine, ValidatedOrder,
};
pub use workflow::OrderProcessingWorkflow;
