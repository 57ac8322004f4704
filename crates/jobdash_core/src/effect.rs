use std::time::Duration;

use crate::{
    ActionId, AttemptId, JobAction, JobFilter, JobId, RequestId, SelectedResume, SessionId, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SyncUser {
        user_id: UserId,
    },
    CheckResume {
        session: SessionId,
        user_id: UserId,
    },
    OpenStatusChannel {
        session: SessionId,
        user_id: UserId,
    },
    CloseStatusChannel,
    UploadResume {
        attempt: AttemptId,
        user_id: UserId,
        file: SelectedResume,
    },
    FetchJobs {
        request_id: RequestId,
        user_id: UserId,
        page: u32,
        limit: u32,
        filter: JobFilter,
    },
    FetchBookmarks {
        session: SessionId,
        user_id: UserId,
    },
    SubmitJobAction {
        action_id: ActionId,
        user_id: UserId,
        job_id: JobId,
        action: JobAction,
    },
    /// Fetch counters after `delay`; zero means immediately.
    FetchStats {
        session: SessionId,
        user_id: UserId,
        delay: Duration,
    },
    /// Tell every subscriber that saved/applied counts changed.
    PublishStatsChanged,
}
