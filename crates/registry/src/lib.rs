// Backend registry: container records keyed by IP, upserted by the pinger.

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
