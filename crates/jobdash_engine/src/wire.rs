//! JSON shapes exchanged with the API and the status channel.
//!
//! Job payloads are loosely typed on the server side; every optional field is
//! spelled out here and validated once, so the core only sees [`Job`].
use jobdash_core::{Job, JobId, PushEvent, StatsCounts, UserId, UserJobActions};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("empty field `{0}`")]
    EmptyField(&'static str),
    #[error("unknown status event `{0}`")]
    UnknownEvent(String),
    #[error("malformed json: {0}")]
    Json(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobActionRequest<'a> {
    pub user_id: &'a str,
    pub job_id: &'a str,
    pub action: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckResumeResponse {
    pub has_resume: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobsResponse {
    /// Rows stay raw so one malformed job cannot fail the page.
    #[serde(default)]
    pub jobs: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserActionsResponse {
    #[serde(default)]
    saved: Vec<WireId>,
    #[serde(default)]
    applied: Vec<WireId>,
}

impl From<UserActionsResponse> for UserJobActions {
    fn from(value: UserActionsResponse) -> Self {
        Self {
            saved: value.saved.into_iter().map(WireId::into_job_id).collect(),
            applied: value.applied.into_iter().map(WireId::into_job_id).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    #[serde(default)]
    saved: u32,
    #[serde(default)]
    applied: u32,
}

impl From<StatsResponse> for StatsCounts {
    fn from(value: StatsResponse) -> Self {
        Self {
            saved: value.saved,
            applied: value.applied,
        }
    }
}

/// Ids arrive as numbers from some endpoints and strings from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Str(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Int(value) => value.to_string(),
            WireId::Str(value) => value,
        }
    }

    fn into_job_id(self) -> JobId {
        JobId::new(self.into_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Number(value) => value.to_string(),
            Scalar::Text(value) => value,
        }
    }
}

/// `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    id: Option<WireId>,
    title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    location: String,
    #[serde(default)]
    salary: Option<Scalar>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default, alias = "match_percentage", alias = "relevancy")]
    match_percentage: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    posted: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    rating: Option<Scalar>,
    #[serde(default)]
    experience: Option<Scalar>,
    #[serde(default, deserialize_with = "null_as_default")]
    responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    requirements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    benefits: Vec<String>,
    #[serde(default, alias = "company_info")]
    company_info: Option<String>,
}

impl JobPayload {
    /// Decodes and validates one row of a job page.
    pub fn job_from_value(value: serde_json::Value) -> Result<Job, PayloadError> {
        serde_json::from_value::<JobPayload>(value)
            .map_err(|err| PayloadError::Json(err.to_string()))?
            .validate()
    }

    pub fn validate(self) -> Result<Job, PayloadError> {
        let id = self
            .id
            .ok_or(PayloadError::MissingField("id"))?
            .into_string();
        if id.trim().is_empty() {
            return Err(PayloadError::EmptyField("id"));
        }
        let title = self.title.ok_or(PayloadError::MissingField("title"))?;
        if title.trim().is_empty() {
            return Err(PayloadError::EmptyField("title"));
        }
        Ok(Job {
            id: JobId::new(id),
            title,
            company: self.company,
            location: self.location,
            salary: self.salary.map(Scalar::into_text).unwrap_or_default(),
            tags: self.tags,
            match_percentage: self.match_percentage.map(clamp_percent),
            posted: self.posted,
            description: self.description,
            logo: self.logo.filter(|logo| !logo.is_empty()),
            rating: self.rating.map(Scalar::into_text),
            experience: self.experience.map(Scalar::into_text),
            responsibilities: self.responsibilities,
            requirements: self.requirements,
            benefits: self.benefits,
            company_info: self.company_info,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushPayload {
    #[serde(alias = "user_id")]
    user_id: Option<WireId>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

pub const EVENT_PROGRESS: &str = "resume_progress";
pub const EVENT_PROCESSING: &str = "resume_processing";
pub const EVENT_PROCESSED: &str = "resume_processed";
pub const EVENT_ERROR: &str = "resume_error";

/// Decodes one status-channel event from its name and JSON data.
pub fn decode_push_event(name: &str, data: &str) -> Result<PushEvent, PayloadError> {
    if ![EVENT_PROGRESS, EVENT_PROCESSING, EVENT_PROCESSED, EVENT_ERROR].contains(&name) {
        return Err(PayloadError::UnknownEvent(name.to_string()));
    }
    let payload: PushPayload =
        serde_json::from_str(data).map_err(|err| PayloadError::Json(err.to_string()))?;
    let user_id = UserId::new(
        payload
            .user_id
            .ok_or(PayloadError::MissingField("userId"))?
            .into_string(),
    );
    let error = payload.error.filter(|message| !message.trim().is_empty());

    let event = match name {
        EVENT_PROGRESS => PushEvent::Progress {
            user_id,
            progress: clamp_percent(payload.progress.ok_or(PayloadError::MissingField("progress"))?),
        },
        EVENT_PROCESSING => PushEvent::Processing {
            user_id,
            progress: payload.progress.map(clamp_percent),
        },
        EVENT_PROCESSED => PushEvent::Processed {
            user_id,
            success: payload.success.ok_or(PayloadError::MissingField("success"))?,
            error,
        },
        _ => PushEvent::Error { user_id, error },
    };
    Ok(event)
}

fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
