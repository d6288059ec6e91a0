use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use super::{Delivery, PingReport, ReportError, Reporter};

/// Posts reports to `{backend}/v1/containers/{ip}`.
pub struct HttpReporter {
    client: reqwest::Client,
    backend: String,
}

impl HttpReporter {
    pub fn new(backend: &str, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            backend: backend.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, ip: &str) -> String {
        format!("{}/v1/containers/{}", self.backend, ip)
    }

    async fn post(&self, ip: &str, report: &PingReport) -> Result<Delivery, ReportError> {
        let url = self.endpoint(ip);
        let response = self.client
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Rejected { status: status.as_u16(), body });
        }

        debug!(%url, status = status.as_u16(), "Report accepted");
        Ok(Delivery::Delivered { created: status == StatusCode::CREATED })
    }
}

impl Reporter for HttpReporter {
    fn deliver<'a>(
        &'a self,
        ip: &'a str,
        report: &'a PingReport,
    ) -> Pin<Box<dyn Future<Output = Result<Delivery, ReportError>> + Send + 'a>> {
        Box::pin(self.post(ip, report))
    }
}
