//! Converges designated-network membership to "every running
//! container is attached".

pub mod error;
pub mod outcome;
pub mod reconciler;

pub use error::ReconcileError;
pub use outcome::{AttachOutcome, ReconcileReport};
pub use reconciler::Reconciler;
