// Domain-driven module structure for the pinger.

// Core infrastructure
pub mod docker;
pub mod client;
pub mod conf;
pub mod metrics;

// Domain modules
pub mod inventory;
pub mod reconcile;
pub mod probe;
pub mod report;
pub mod job;
pub mod runtime;
