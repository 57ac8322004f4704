use std::path::PathBuf;

use crate::{
    ActionId, ActionKind, AttemptId, ChannelState, JobId, JobPage, PushEvent, RequestId,
    SessionId, StatsCounts, UserId, UserJobActions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Identity provider reported a signed-in user.
    UserSignedIn(UserId),
    /// Session ended or the identity provider dropped the user.
    UserSignedOut,
    /// Best-effort user sync finished.
    UserSynced(Result<(), String>),
    /// One-shot has-resume check finished.
    ResumeChecked {
        session: SessionId,
        result: Result<bool, String>,
    },
    /// User picked a file in the upload form.
    ResumeFileSelected {
        path: PathBuf,
        mime: Option<String>,
    },
    /// User pressed "Upload Resume".
    UploadSubmitted,
    /// Upload transport finished the submission request.
    UploadFinished {
        attempt: AttemptId,
        result: Result<(), String>,
    },
    /// User pressed "Try Again" after a failed upload.
    UploadRetryClicked,
    /// Sidebar "Upload Resume" dialog opened.
    UploadDialogOpened,
    UploadDialogClosed,
    /// Status-channel event.
    Push(PushEvent),
    ChannelStateChanged {
        session: SessionId,
        state: ChannelState,
    },
    /// Filter sheet edits. They touch the draft only until applied.
    FilterSkillToggled(String),
    FilterSalaryChanged {
        lower: u32,
        upper: u32,
    },
    FilterRemoteChanged(bool),
    FiltersApplied,
    FiltersReset,
    /// A page of recommended jobs arrived.
    JobsLoaded {
        request_id: RequestId,
        result: Result<JobPage, String>,
    },
    LoadMoreClicked,
    /// Job list scrolled to its end.
    ScrolledToBottom,
    RetryJobsClicked,
    BookmarksLoaded {
        session: SessionId,
        result: Result<UserJobActions, String>,
    },
    /// Save or apply toggle on a job card.
    ToggleClicked {
        kind: ActionKind,
        job_id: JobId,
    },
    JobActionFinished {
        action_id: ActionId,
        result: Result<(), String>,
    },
    JobSelected(JobId),
    DetailClosed,
    /// Stats-changed broadcast observed on the event bus.
    StatsChanged,
    StatsLoaded {
        session: SessionId,
        result: Result<StatsCounts, String>,
    },
    RetryStatsClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
