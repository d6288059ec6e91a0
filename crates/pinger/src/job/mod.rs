//! The reconcile/collect/probe/report loop.

pub mod cycle;
pub mod pinger;

pub use cycle::{CycleError, CycleState, CycleSummary};
pub use pinger::Pinger;
