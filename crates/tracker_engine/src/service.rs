use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracker_core::{Job, JobId};
use tracker_logging::tracker_trace;
use url::Url;

use crate::{CancelReceipt, FailureKind, IndexJobRequest, ServiceError};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Root of the job API, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Authoritative source of job records.
#[async_trait::async_trait]
pub trait JobService: Send + Sync {
    async fn list_jobs(&self, active_only: bool) -> Result<Vec<Job>, ServiceError>;

    /// Fails with [`FailureKind::NotFound`] when the server does not know the id.
    async fn get_job_status(&self, job_id: &str) -> Result<Job, ServiceError>;

    async fn cancel_job(&self, job_id: &str) -> Result<CancelReceipt, ServiceError>;

    async fn create_index_job(&self, request: &IndexJobRequest) -> Result<JobId, ServiceError>;
}

#[derive(Deserialize)]
struct JobList {
    jobs: Vec<Job>,
}

#[derive(Deserialize)]
struct CreatedJob {
    job_id: JobId,
}

/// [`JobService`] over the HTTP/JSON job API.
#[derive(Debug, Clone)]
pub struct HttpJobService {
    base: Url,
    client: reqwest::Client,
}

impl HttpJobService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot carry a path", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        tracker_trace!("job api answered {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        serde_json::from_slice(&body)
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl JobService for HttpJobService {
    async fn list_jobs(&self, active_only: bool) -> Result<Vec<Job>, ServiceError> {
        let mut url = self.endpoint(&["index", "jobs"]);
        url.query_pairs_mut()
            .append_pair("active_only", if active_only { "true" } else { "false" });
        let list: JobList = self.send(self.client.get(url)).await?;
        Ok(list.jobs)
    }

    async fn get_job_status(&self, job_id: &str) -> Result<Job, ServiceError> {
        let url = self.endpoint(&["index", "jobs", job_id]);
        self.send(self.client.get(url)).await
    }

    async fn cancel_job(&self, job_id: &str) -> Result<CancelReceipt, ServiceError> {
        let url = self.endpoint(&["index", "jobs", job_id, "cancel"]);
        self.send(self.client.post(url)).await
    }

    async fn create_index_job(&self, request: &IndexJobRequest) -> Result<JobId, ServiceError> {
        let url = self.endpoint(&["index", "jobs"]);
        let created: CreatedJob = self.send(self.client.post(url).json(request)).await?;
        Ok(created.job_id)
    }
}

/// Turns an error response into a [`ServiceError`], preferring the server's
/// `detail` message when one is present.
fn status_error(status: StatusCode, body: &[u8]) -> ServiceError {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str()).map(str::to_owned));

    let kind = match status {
        StatusCode::NOT_FOUND => FailureKind::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            FailureKind::Rejected
        }
        other => FailureKind::HttpStatus(other.as_u16()),
    };
    ServiceError::new(kind, detail.unwrap_or_else(|| status.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ServiceError::new(FailureKind::Decode, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
