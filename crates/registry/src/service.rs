use std::sync::Arc;

use tracing::{debug, info};

use crate::model::{ContainerRecord, PingReport};
use crate::store::{ContainerRepo, RepoError};

/// Result of applying a ping report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted {
    Created(ContainerRecord),
    Updated(ContainerRecord),
}

impl Upserted {
    pub fn record(&self) -> &ContainerRecord {
        match self {
            Upserted::Created(r) | Upserted::Updated(r) => r,
        }
    }

    pub fn into_record(self) -> ContainerRecord {
        match self {
            Upserted::Created(r) | Upserted::Updated(r) => r,
        }
    }
}

/// Container record use cases.
#[derive(Clone)]
pub struct ContainerService {
    repo: Arc<dyn ContainerRepo>,
}

impl ContainerService {
    pub fn new(repo: Arc<dyn ContainerRepo>) -> Self {
        Self { repo }
    }

    pub async fn container(&self, ip: &str) -> Result<Option<ContainerRecord>, RepoError> {
        self.repo.get(ip).await
    }

    pub async fn all_containers(&self) -> Result<Vec<ContainerRecord>, RepoError> {
        self.repo.list().await
    }

    pub async fn new_container(&self, record: ContainerRecord) -> Result<String, RepoError> {
        let record = self.repo.add(record).await?;
        info!(ip = %record.ip, "Container record created");
        Ok(record.ip)
    }

    pub async fn update_container(&self, record: ContainerRecord) -> Result<ContainerRecord, RepoError> {
        self.repo.update(record).await
    }

    pub async fn delete_container(&self, ip: &str) -> Result<(), RepoError> {
        self.repo.delete(ip).await?;
        info!(ip, "Container record deleted");
        Ok(())
    }

    /// Create the record for `ip` if absent, update it otherwise.
    ///
    /// An unsuccessful report refreshes `ping_time` but never advances
    /// `last_successful`.
    pub async fn report(&self, ip: &str, report: PingReport) -> Result<Upserted, RepoError> {
        let success = report.is_successful.then_some(report.last_successful);

        if let Some(existing) = self.repo.get(ip).await? {
            return self.apply(existing, report.ping_time, success).await.map(Upserted::Updated);
        }

        let fresh = ContainerRecord {
            ip: ip.to_string(),
            ping_time: report.ping_time,
            last_successful: success,
        };
        match self.repo.add(fresh).await {
            Ok(record) => {
                info!(ip, ping_time = record.ping_time, "Container record created");
                Ok(Upserted::Created(record))
            }
            // Lost a race with a concurrent report for the same address.
            Err(RepoError::AlreadyExists(_)) => {
                let existing = self.repo.get(ip).await?
                    .ok_or_else(|| RepoError::NotFound(ip.to_string()))?;
                self.apply(existing, report.ping_time, success).await.map(Upserted::Updated)
            }
            Err(e) => Err(e),
        }
    }

    async fn apply(
        &self,
        mut record: ContainerRecord,
        ping_time: u64,
        success: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<ContainerRecord, RepoError> {
        record.ping_time = ping_time;
        if success.is_some() {
            record.last_successful = success;
        }
        let record = self.repo.update(record).await?;
        debug!(ip = %record.ip, ping_time = record.ping_time, "Container record updated");
        Ok(record)
    }
}
