//! Durable message task dispatch queue.
//!
//! The queue is split into four components that share one injected
//! [`MessageTaskRepository`]:
//! 1. [`TaskStore`]: creation and point lookup
//! 2. [`VisibilityGate`]: soft enable/disable, orthogonal to delivery status
//! 3. [`ClaimView`]: bounded, priority-ordered read of claimable tasks
//! 4. [`StatusRecorder`]: the only path that advances delivery status
//!
//! Ownership of a task is decided by the conditional status write performed by
//! [`StatusRecorder::claim`], never by the read in [`ClaimView`].

pub mod claim;
pub mod memory;
pub mod postgres;
pub mod queue;
pub mod recorder;
pub mod repository;
pub mod store;
pub mod visibility;

pub use claim::ClaimView;
pub use memory::MemoryTaskRepository;
pub use postgres::{MessageTaskDao, PgTaskRepository};
pub use queue::MessageTaskQueue;
pub use recorder::StatusRecorder;
pub use repository::MessageTaskRepository;
pub use store::TaskStore;
pub use visibility::VisibilityGate;

#[cfg(test)]
mod test_support;
