//! Reference dispatcher for the Courier message task queue.
//!
//! Polls the claim view, wins tasks through the conditional soft claim, hands
//! them to a [`Deliverer`] and records the outcome.

pub mod deliverer;
pub mod dispatcher;

pub use deliverer::{Deliverer, DeliveryError, LogDeliverer};
pub use dispatcher::{DispatchStats, Dispatcher};
