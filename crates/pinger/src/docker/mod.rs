//! Docker module — bollard-backed client and model conversions.

pub mod client;
pub mod container;
pub mod inventory;
pub mod network;
