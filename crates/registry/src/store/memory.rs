use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{ContainerRepo, RepoError, RepoFuture};
use crate::model::ContainerRecord;

/// In-memory repository. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryRepo {
    records: DashMap<String, ContainerRecord>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ContainerRepo for MemoryRepo {
    fn get<'a>(&'a self, ip: &'a str) -> RepoFuture<'a, Option<ContainerRecord>> {
        Box::pin(async move { Ok(self.records.get(ip).map(|r| r.value().clone())) })
    }

    fn list(&self) -> RepoFuture<'_, Vec<ContainerRecord>> {
        Box::pin(async move {
            let mut records: Vec<ContainerRecord> = self.records
                .iter()
                .map(|r| r.value().clone())
                .collect();
            records.sort_by(|a, b| a.ip.cmp(&b.ip));
            Ok(records)
        })
    }

    fn add(&self, record: ContainerRecord) -> RepoFuture<'_, ContainerRecord> {
        Box::pin(async move {
            match self.records.entry(record.ip.clone()) {
                Entry::Occupied(_) => Err(RepoError::AlreadyExists(record.ip)),
                Entry::Vacant(slot) => {
                    slot.insert(record.clone());
                    Ok(record)
                }
            }
        })
    }

    fn update(&self, record: ContainerRecord) -> RepoFuture<'_, ContainerRecord> {
        Box::pin(async move {
            match self.records.get_mut(&record.ip) {
                Some(mut existing) => {
                    *existing = record.clone();
                    Ok(record)
                }
                None => Err(RepoError::NotFound(record.ip)),
            }
        })
    }

    fn delete<'a>(&'a self, ip: &'a str) -> RepoFuture<'a, ()> {
        Box::pin(async move {
            self.records
                .remove(ip)
                .map(|_| ())
                .ok_or_else(|| RepoError::NotFound(ip.to_string()))
        })
    }
}
