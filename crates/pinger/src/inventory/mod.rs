//! Discovers running containers and their address on the
//! designated network.

pub mod collect;
pub mod resolve;

pub use collect::{collect, probe_targets, DiscoveredContainer};
pub use resolve::resolve_address;
