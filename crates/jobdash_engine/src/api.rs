use std::time::Duration;

use jobdash_core::{
    JobAction, JobFilter, JobId, JobPage, SelectedResume, StatsCounts, UserId, UserJobActions,
};
use jobdash_logging::{dash_debug, dash_warn};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::wire::{
    CheckResumeResponse, JobActionRequest, JobPayload, JobsResponse, StatsResponse,
    UserActionsResponse, UserRequest,
};
use crate::{ApiError, FailureKind};

pub const CHECK_RESUME_PATH: &str = "/api/check-resume";
pub const RECOMMENDED_JOBS_PATH: &str = "/api/recommended-jobs";
pub const UPLOAD_RESUME_PATH: &str = "/api/upload-resume";
pub const JOB_ACTION_PATH: &str = "/api/job-action";
pub const USER_JOB_ACTIONS_PATH: &str = "/api/user-job-actions";
pub const JOB_STATS_PATH: &str = "/api/job-stats";
pub const SYNC_USER_PATH: &str = "/api/sync-user";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One page request against `/api/recommended-jobs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub user_id: UserId,
    pub page: u32,
    pub limit: u32,
    pub filter: JobFilter,
}

/// A validated resume file, read into memory for the multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub async fn read(file: &SelectedResume) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(&file.path).await.map_err(|err| {
            ApiError::new(
                FailureKind::Io,
                format!("{}: {}", file.path.display(), err),
            )
        })?;
        Ok(Self {
            file_name: file.file_name.clone(),
            mime: file.kind.mime(),
            bytes,
        })
    }
}

/// Remote dashboard API. The engine only talks to the server through this.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    async fn sync_user(&self, user_id: &UserId) -> Result<(), ApiError>;
    async fn check_resume(&self, user_id: &UserId) -> Result<bool, ApiError>;
    /// Accepted-for-processing only; processing results arrive on the status channel.
    async fn upload_resume(&self, user_id: &UserId, upload: ResumeUpload) -> Result<(), ApiError>;
    async fn recommended_jobs(&self, query: &JobQuery) -> Result<JobPage, ApiError>;
    async fn user_job_actions(&self, user_id: &UserId) -> Result<UserJobActions, ApiError>;
    async fn job_action(
        &self,
        user_id: &UserId,
        job_id: &JobId,
        action: JobAction,
    ) -> Result<(), ApiError>;
    async fn job_stats(&self, user_id: &UserId) -> Result<StatsCounts, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        // Reject a bad base before any request is made.
        Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        endpoint_url(&self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    async fn send_ok(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ))
        }
    }

    fn user_url(&self, path: &str, user_id: &UserId) -> Result<Url, ApiError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("userId", user_id.as_str());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl DashboardApi for ReqwestApi {
    async fn sync_user(&self, user_id: &UserId) -> Result<(), ApiError> {
        let url = self.endpoint(SYNC_USER_PATH)?;
        let body = UserRequest {
            user_id: user_id.as_str(),
        };
        self.send_ok(self.client.post(url).json(&body)).await
    }

    async fn check_resume(&self, user_id: &UserId) -> Result<bool, ApiError> {
        let url = self.endpoint(CHECK_RESUME_PATH)?;
        let body = UserRequest {
            user_id: user_id.as_str(),
        };
        let response: CheckResumeResponse =
            self.send_json(self.client.post(url).json(&body)).await?;
        Ok(response.has_resume)
    }

    async fn upload_resume(&self, user_id: &UserId, upload: ResumeUpload) -> Result<(), ApiError> {
        let url = self.endpoint(UPLOAD_RESUME_PATH)?;
        let byte_len = upload.bytes.len();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime)
            .map_err(|err| ApiError::new(FailureKind::InvalidPayload, err.to_string()))?;
        let form = Form::new()
            .part("resume", part)
            .text("userId", user_id.as_str().to_string());
        dash_debug!("Uploading resume for {} ({} bytes)", user_id, byte_len);
        self.send_ok(self.client.post(url).multipart(form)).await
    }

    async fn recommended_jobs(&self, query: &JobQuery) -> Result<JobPage, ApiError> {
        let url = recommended_jobs_url(&self.endpoint(RECOMMENDED_JOBS_PATH)?, query);
        let response: JobsResponse = self.send_json(self.client.get(url)).await?;
        let mut jobs = Vec::with_capacity(response.jobs.len());
        for row in response.jobs {
            match JobPayload::job_from_value(row) {
                Ok(job) => jobs.push(job),
                Err(err) => dash_warn!("Skipping job with invalid payload: {}", err),
            }
        }
        Ok(JobPage {
            jobs,
            has_more: response.has_more,
        })
    }

    async fn user_job_actions(&self, user_id: &UserId) -> Result<UserJobActions, ApiError> {
        let url = self.user_url(USER_JOB_ACTIONS_PATH, user_id)?;
        let response: UserActionsResponse = self.send_json(self.client.get(url)).await?;
        Ok(response.into())
    }

    async fn job_action(
        &self,
        user_id: &UserId,
        job_id: &JobId,
        action: JobAction,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(JOB_ACTION_PATH)?;
        let body = JobActionRequest {
            user_id: user_id.as_str(),
            job_id: job_id.as_str(),
            action: action.as_str(),
            kind: action.kind().as_str(),
        };
        self.send_ok(self.client.post(url).json(&body)).await
    }

    async fn job_stats(&self, user_id: &UserId) -> Result<StatsCounts, ApiError> {
        let url = self.user_url(JOB_STATS_PATH, user_id)?;
        let response: StatsResponse = self.send_json(self.client.get(url)).await?;
        Ok(response.into())
    }
}

pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url, ApiError> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
}

/// Adds the paging and filter parameters. `skills` is comma-joined and left
/// out when empty; `remote` is only sent when set.
pub fn recommended_jobs_url(endpoint: &Url, query: &JobQuery) -> Url {
    let mut url = endpoint.clone();
    let (min_salary, max_salary) = query.filter.salary_range();
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("userId", query.user_id.as_str())
            .append_pair("page", &query.page.to_string())
            .append_pair("limit", &query.limit.to_string());
        if !query.filter.skills().is_empty() {
            pairs.append_pair("skills", &query.filter.skills().join(","));
        }
        if query.filter.remote_only() {
            pairs.append_pair("remote", "true");
        }
        pairs
            .append_pair("minSalary", &min_salary.to_string())
            .append_pair("maxSalary", &max_salary.to_string());
    }
    url
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
