//! Dashboard core: pure state machine and view-model helpers.
//!
//! Nothing here performs IO. The shell feeds [`Msg`] values into [`update`]
//! and executes the returned [`Effect`]s.
mod effect;
mod filter;
mod jobs;
mod msg;
mod state;
mod stats;
mod types;
mod update;
mod upload;
mod view_model;

pub use effect::Effect;
pub use filter::{
    JobFilter, DEFAULT_SALARY_RANGE, SALARY_MAX, SALARY_MIN, SALARY_STEP, SKILL_CATALOG,
};
pub use jobs::{JobListState, PageRequest};
pub use msg::Msg;
pub use state::{
    AppState, DashboardSettings, ResumeGate, DEFAULT_PAGE_SIZE, DEFAULT_STATS_REFRESH_DELAY,
};
pub use stats::StatsState;
pub use types::{
    ActionId, ActionKind, AttemptId, ChannelState, Job, JobAction, JobId, JobPage, PushEvent,
    RequestId, SessionId, StatsCounts, UserId, UserJobActions,
};
pub use update::update;
pub use upload::{
    validate_resume_file, DocumentKind, SelectedResume, UploadMachine, UploadPhase, UploadSignal,
    INVALID_TYPE_MESSAGE, NO_FILE_MESSAGE, PROCESSING_FAILED_MESSAGE, TRANSPORT_FAILED_MESSAGE,
};
pub use view_model::{
    AppViewModel, FilterView, JobRowView, JobsView, Screen, SkillChip, StatsView, UploadView,
};
