//! HTTP client for the LuxPrima backend API.
//!
//! All paths are relative to a configured base (e.g.
//! `http://localhost:8000/api`). Probe methods map every failure mode —
//! connection refused, timeout, non-2xx — to an error; the polling layer
//! collapses those into a Down signal without distinguishing them.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::data::{
    HealthPayload, JobStatus, LocalModels, NewSchedule, NewSource, NextRun, Report, Schedule,
    SettingUpdate, Settings, Source,
};

/// Default request timeout. A hung request resolves to a failure instead of
/// pinning a connection per poll tick.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with a non-success status code.
    #[error("API returned status {0}")]
    Status(reqwest::StatusCode),

    /// Could not reach the server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body was not what we expected.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Thin wrapper around [`reqwest::Client`] for the LuxPrima REST surface.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the given API base URL. A trailing slash on the
    /// base is tolerated and removed.
    pub fn new(base: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// The configured API base URL.
    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        let response = self.client.post(&url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = self.url(path);
        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(())
    }

    // --- sources ---

    pub async fn sources(&self) -> ClientResult<Vec<Source>> {
        self.get_json("/sources/").await
    }

    pub async fn create_source(&self, source: &NewSource) -> ClientResult<Source> {
        self.post_json("/sources/", source).await
    }

    pub async fn delete_source(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/sources/{id}")).await
    }

    // --- reports ---

    pub async fn reports(&self) -> ClientResult<Vec<Report>> {
        self.get_json("/reports/").await
    }

    pub async fn report(&self, id: i64) -> ClientResult<Report> {
        self.get_json(&format!("/reports/{id}")).await
    }

    /// Kick off a generation run. Fire-and-forget; the backend runs the job
    /// in the background and progress is observed via [`Self::job_status`].
    pub async fn generate_report(&self) -> ClientResult<()> {
        let _: serde_json::Value = self.post_json("/reports/generate", &()).await?;
        Ok(())
    }

    pub async fn delete_report(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/reports/{id}")).await
    }

    pub async fn job_status(&self) -> ClientResult<JobStatus> {
        self.get_json("/reports/status").await
    }

    /// Download the rendered PDF for a report.
    pub async fn report_pdf(&self, id: i64) -> ClientResult<Vec<u8>> {
        let url = self.url(&format!("/reports/{id}/pdf"));
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn share_report(&self, id: i64, email: &str) -> ClientResult<()> {
        let body = serde_json::json!({ "email": email });
        let _: serde_json::Value = self
            .post_json(&format!("/reports/{id}/share"), &body)
            .await?;
        Ok(())
    }

    // --- schedules ---

    pub async fn schedules(&self) -> ClientResult<Vec<Schedule>> {
        self.get_json("/schedules/").await
    }

    pub async fn create_schedule(&self, schedule: &NewSchedule) -> ClientResult<Schedule> {
        self.post_json("/schedules/", schedule).await
    }

    pub async fn delete_schedule(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/schedules/{id}")).await
    }

    pub async fn next_run(&self) -> ClientResult<NextRun> {
        self.get_json("/schedules/next-run").await
    }

    // --- settings ---

    pub async fn settings(&self) -> ClientResult<Settings> {
        self.get_json("/settings/").await
    }

    /// Batch upsert of key/value pairs. Returns the full map after the
    /// update so the caller can replace its snapshot wholesale.
    pub async fn save_settings(&self, updates: &[SettingUpdate]) -> ClientResult<Settings> {
        self.post_json("/settings/", &updates).await
    }

    pub async fn local_models(&self, base_url: &str) -> ClientResult<LocalModels> {
        let url = self.url("/settings/local-models");
        let response = self
            .client
            .get(&url)
            .query(&[("base_url", base_url)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    // --- health probes ---

    /// Probe the backend root health endpoint.
    ///
    /// Deliberately hits the base with no trailing slash to avoid a 307
    /// redirect on some deployments.
    pub async fn system_health(&self) -> ClientResult<HealthPayload> {
        let response = self.client.get(&self.base).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Probe an external inference endpoint at `{base}/health`.
    ///
    /// Any 2xx counts as up; the `{"status": "ok"}` body is not required.
    pub async fn intelligence_health(&self, base: &str) -> ClientResult<()> {
        let url = format!("{}/health", base.trim_end_matches('/'));
        debug!(%url, "probing intelligence endpoint");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_trailing_slash_removed() {
        let client = ApiClient::new("http://localhost:8000/api/");
        assert_eq!(client.base(), "http://localhost:8000/api");
        assert_eq!(client.url("/reports/status"), "http://localhost:8000/api/reports/status");
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Status(reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "API returned status 502 Bad Gateway");
        assert_eq!(ClientError::Timeout.to_string(), "request timed out");
    }
}
