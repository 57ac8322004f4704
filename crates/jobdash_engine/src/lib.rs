//! JobDash engine: HTTP API client, status channel and effect execution.
mod api;
mod backoff;
mod bus;
mod engine;
mod push;
mod sse;
mod types;
mod wire;

pub use api::{
    recommended_jobs_url, ApiSettings, DashboardApi, JobQuery, ReqwestApi, ResumeUpload,
    CHECK_RESUME_PATH, JOB_ACTION_PATH, JOB_STATS_PATH, RECOMMENDED_JOBS_PATH,
    SYNC_USER_PATH, UPLOAD_RESUME_PATH, USER_JOB_ACTIONS_PATH,
};
pub use backoff::BackoffPolicy;
pub use bus::{BusEvent, EventBus};
pub use engine::{EngineConfig, EngineHandle};
pub use push::{
    run_status_channel, status_channel_url, status_client, ChannelEventSink, EventSink,
    PushSettings,
};
pub use sse::{SseDecoder, SseFrame};
pub use types::{ApiError, EngineError, EngineEvent, FailureKind};
pub use wire::{
    decode_push_event, JobPayload, PayloadError, EVENT_ERROR, EVENT_PROCESSED,
    EVENT_PROCESSING, EVENT_PROGRESS,
};
