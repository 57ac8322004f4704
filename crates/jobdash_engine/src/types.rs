use std::fmt;

use jobdash_core::{
    ActionId, AttemptId, ChannelState, JobPage, PushEvent, RequestId, SessionId, StatsCounts,
    UserJobActions,
};

/// Everything the engine reports back to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UserSynced {
        result: Result<(), ApiError>,
    },
    ResumeChecked {
        session: SessionId,
        result: Result<bool, ApiError>,
    },
    UploadFinished {
        attempt: AttemptId,
        result: Result<(), ApiError>,
    },
    JobsFetched {
        request_id: RequestId,
        result: Result<JobPage, ApiError>,
    },
    BookmarksFetched {
        session: SessionId,
        result: Result<UserJobActions, ApiError>,
    },
    JobActionFinished {
        action_id: ActionId,
        result: Result<(), ApiError>,
    },
    StatsFetched {
        session: SessionId,
        result: Result<StatsCounts, ApiError>,
    },
    /// Decoded status-channel event. Not yet filtered by user.
    Push(PushEvent),
    /// Connection state of the status channel opened for `session`.
    Channel {
        session: SessionId,
        state: ChannelState,
    },
    /// Stats-changed broadcast observed on the event bus.
    StatsChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not the JSON shape the endpoint promises.
    Decode,
    /// JSON decoded but failed schema validation.
    InvalidPayload,
    /// Local file could not be read.
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::InvalidPayload => write!(f, "invalid payload"),
            FailureKind::Io => write!(f, "file error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(ApiError),
}
