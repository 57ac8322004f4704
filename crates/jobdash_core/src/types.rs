use std::fmt;

/// Monotonic id of a job-page request; responses for older ids are stale.
pub type RequestId = u64;
/// Id of an optimistic save/apply toggle awaiting confirmation.
pub type ActionId = u64;
/// Upload submission counter; transport results for older attempts are dropped.
pub type AttemptId = u64;
/// Sign-in counter. Replies tagged with an older session are dropped.
pub type SessionId = u64;

/// Opaque identifier handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recommended job as served by the API. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub tags: Vec<String>,
    pub match_percentage: Option<u8>,
    pub posted: String,
    pub description: String,
    pub logo: Option<String>,
    pub rating: Option<String>,
    pub experience: Option<String>,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub company_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub has_more: bool,
}

/// Which bookmark set an action touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Saved,
    Applied,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Saved => "saved",
            ActionKind::Applied => "applied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Save,
    Unsave,
    Apply,
    Unapply,
}

impl JobAction {
    /// Action that moves a job into (`mark = true`) or out of the given set.
    pub fn toggle(kind: ActionKind, mark: bool) -> Self {
        match (kind, mark) {
            (ActionKind::Saved, true) => JobAction::Save,
            (ActionKind::Saved, false) => JobAction::Unsave,
            (ActionKind::Applied, true) => JobAction::Apply,
            (ActionKind::Applied, false) => JobAction::Unapply,
        }
    }

    pub fn kind(self) -> ActionKind {
        match self {
            JobAction::Save | JobAction::Unsave => ActionKind::Saved,
            JobAction::Apply | JobAction::Unapply => ActionKind::Applied,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobAction::Save => "save",
            JobAction::Unsave => "unsave",
            JobAction::Apply => "apply",
            JobAction::Unapply => "unapply",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsCounts {
    pub saved: u32,
    pub applied: u32,
}

/// Server-side bookmark membership for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserJobActions {
    pub saved: Vec<JobId>,
    pub applied: Vec<JobId>,
}

/// Status-channel event, already decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Progress {
        user_id: UserId,
        progress: u8,
    },
    Processing {
        user_id: UserId,
        progress: Option<u8>,
    },
    Processed {
        user_id: UserId,
        success: bool,
        error: Option<String>,
    },
    Error {
        user_id: UserId,
        error: Option<String>,
    },
}

impl PushEvent {
    pub fn user_id(&self) -> &UserId {
        match self {
            PushEvent::Progress { user_id, .. }
            | PushEvent::Processing { user_id, .. }
            | PushEvent::Processed { user_id, .. }
            | PushEvent::Error { user_id, .. } => user_id,
        }
    }
}

/// Lifecycle of the status channel as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Closed,
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
    },
}
