//! Client module — the runtime trait seam and its implementations.

pub mod docker;
pub mod fake;
pub mod live;

pub use docker::RuntimeOps;
pub use fake::FakeRuntime;
