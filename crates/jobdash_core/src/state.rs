use std::time::Duration;

use crate::jobs::JobListState;
use crate::stats::StatsState;
use crate::upload::UploadMachine;
use crate::view_model::{self, AppViewModel};
use crate::{ChannelState, JobFilter, SessionId, UserId};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Settle time between a stats-changed broadcast and the re-fetch.
pub const DEFAULT_STATS_REFRESH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub page_size: u32,
    pub stats_refresh_delay: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            stats_refresh_delay: DEFAULT_STATS_REFRESH_DELAY,
        }
    }
}

/// Whether the dashboard may show the job list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeGate {
    #[default]
    SignedOut,
    /// Has-resume check in flight.
    Checking,
    /// No resume on file: the upload form is shown.
    Missing,
    /// Resume on file: the job view is shown.
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) settings: DashboardSettings,
    pub(crate) user: Option<UserId>,
    /// Bumped on every sign-in and never reset.
    pub(crate) session: SessionId,
    pub(crate) gate: ResumeGate,
    /// Bumped every time the job view is (re)mounted with a fresh fetch.
    pub(crate) generation: u64,
    pub(crate) upload: UploadMachine,
    pub(crate) upload_dialog_open: bool,
    pub(crate) draft_filter: JobFilter,
    pub(crate) list: JobListState,
    pub(crate) stats: StatsState,
    pub(crate) channel: ChannelState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: DashboardSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> DashboardSettings {
        self.settings
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn gate(&self) -> ResumeGate {
        self.gate
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn upload(&self) -> &UploadMachine {
        &self.upload
    }

    pub fn jobs(&self) -> &JobListState {
        &self.list
    }

    pub fn stats(&self) -> &StatsState {
        &self.stats
    }

    pub fn draft_filter(&self) -> &JobFilter {
        &self.draft_filter
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self, self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Upload form is on screen: either as the gated main view or as the
    /// sidebar dialog.
    pub(crate) fn upload_visible(&self) -> bool {
        match self.gate {
            ResumeGate::Missing => true,
            ResumeGate::Ready => self.upload_dialog_open,
            ResumeGate::SignedOut | ResumeGate::Checking => false,
        }
    }

    /// Whether a reply tagged `session` belongs to the signed-in user.
    pub(crate) fn is_current(&self, session: SessionId) -> bool {
        self.user.is_some() && self.session == session
    }

    /// Drops the session. Session, request and attempt counters keep counting.
    pub(crate) fn end_session(&mut self) {
        self.user = None;
        self.gate = ResumeGate::SignedOut;
        self.upload.reset();
        self.upload_dialog_open = false;
        self.draft_filter = JobFilter::default();
        self.list.clear();
        self.stats = StatsState::default();
        self.channel = ChannelState::Closed;
        self.mark_dirty();
    }
}
