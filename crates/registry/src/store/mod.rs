//! Container record persistence.

pub mod memory;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::model::ContainerRecord;

pub use memory::MemoryRepo;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Container already exists: {0}")]
    AlreadyExists(String),
    #[error("Container not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type RepoFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepoError>> + Send + 'a>>;

/// Container record repository.
///
/// Lookups return `Ok(None)` for an unknown address so callers can tell
/// "absent" apart from a storage failure and decide to create.
pub trait ContainerRepo: Send + Sync {
    fn get<'a>(&'a self, ip: &'a str) -> RepoFuture<'a, Option<ContainerRecord>>;

    fn list(&self) -> RepoFuture<'_, Vec<ContainerRecord>>;

    /// Insert a new record. Fails with [`RepoError::AlreadyExists`].
    fn add(&self, record: ContainerRecord) -> RepoFuture<'_, ContainerRecord>;

    /// Replace an existing record. Fails with [`RepoError::NotFound`].
    fn update(&self, record: ContainerRecord) -> RepoFuture<'_, ContainerRecord>;

    /// Remove a record. Fails with [`RepoError::NotFound`].
    fn delete<'a>(&'a self, ip: &'a str) -> RepoFuture<'a, ()>;
}
