use crate::filter::SKILL_CATALOG;
use crate::state::{AppState, ResumeGate};
use crate::upload::{UploadMachine, UploadPhase};
use crate::{ActionKind, ChannelState, Job, JobId, StatsCounts};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub user: Option<String>,
    pub screen: Screen,
    /// Sidebar upload dialog, only while the job view is shown.
    pub upload_dialog: Option<UploadView>,
    pub stats: Option<StatsView>,
    pub channel: ChannelState,
    pub generation: u64,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    SignedOut,
    Loading,
    Upload(UploadView),
    Jobs(JobsView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub phase: UploadPhase,
    pub progress: u8,
    /// Shown only while uploading or processing.
    pub progress_label: Option<String>,
    pub button_label: &'static str,
    pub file_name: Option<String>,
    pub error: Option<String>,
    pub validation_error: Option<String>,
    pub can_submit: bool,
    pub can_retry: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsView {
    pub filter: FilterView,
    pub jobs: Vec<JobRowView>,
    pub loading: bool,
    pub error: Option<String>,
    pub action_error: Option<String>,
    pub show_more: bool,
    /// "No jobs match your filters" with a reset affordance.
    pub empty_notice: bool,
    pub detail: Option<Job>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub tags: Vec<String>,
    pub match_label: Option<String>,
    pub posted: String,
    pub saved: bool,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterView {
    pub salary_range: (u32, u32),
    pub skills: Vec<SkillChip>,
    pub remote: bool,
    pub active_count: usize,
    pub active_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillChip {
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsView {
    pub counts: StatsCounts,
    pub loading: bool,
    pub error: Option<String>,
}

pub(crate) fn build(state: &AppState, dirty: bool) -> AppViewModel {
    let screen = match state.gate {
        ResumeGate::SignedOut => Screen::SignedOut,
        ResumeGate::Checking => Screen::Loading,
        ResumeGate::Missing => Screen::Upload(upload_view(&state.upload)),
        ResumeGate::Ready => Screen::Jobs(jobs_view(state)),
    };
    let ready = state.gate == ResumeGate::Ready;
    let upload_dialog =
        (ready && state.upload_dialog_open).then(|| upload_view(&state.upload));
    let stats = ready.then(|| StatsView {
        counts: state.stats.counts(),
        loading: state.stats.is_loading(),
        error: state.stats.error().map(str::to_owned),
    });

    AppViewModel {
        user: state.user.as_ref().map(ToString::to_string),
        screen,
        upload_dialog,
        stats,
        channel: state.channel,
        generation: state.generation,
        dirty,
    }
}

fn upload_view(upload: &UploadMachine) -> UploadView {
    let phase = upload.phase();
    let progress = upload.progress();
    let progress_label = phase.is_busy().then(|| {
        if progress < 100 {
            format!("{progress}%")
        } else {
            "Complete".to_string()
        }
    });
    let button_label = match phase {
        UploadPhase::Uploading => "Uploading your resume...",
        UploadPhase::Processing => "Processing your resume...",
        UploadPhase::Idle | UploadPhase::Success | UploadPhase::Error => "Upload Resume",
    };
    UploadView {
        phase,
        progress,
        progress_label,
        button_label,
        file_name: upload.selected().map(|file| file.file_name.clone()),
        error: upload.error().map(str::to_owned),
        validation_error: upload.validation_error().map(str::to_owned),
        can_submit: matches!(phase, UploadPhase::Idle | UploadPhase::Success),
        can_retry: phase == UploadPhase::Error,
    }
}

fn jobs_view(state: &AppState) -> JobsView {
    let list = &state.list;
    let draft = &state.draft_filter;
    let jobs: Vec<JobRowView> = list
        .jobs()
        .iter()
        .map(|job| JobRowView {
            id: job.id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            tags: job.tags.clone(),
            match_label: job.match_percentage.map(|pct| format!("{pct}% Match")),
            posted: job.posted.clone(),
            saved: list.is_marked(ActionKind::Saved, &job.id),
            applied: list.is_marked(ActionKind::Applied, &job.id),
        })
        .collect();
    let loading = list.is_loading();
    let error = list.error().map(str::to_owned);
    let show_more = list.has_more() && !loading && error.is_none();
    let empty_notice = jobs.is_empty() && !loading && error.is_none() && list.page() >= 1;

    JobsView {
        filter: FilterView {
            salary_range: draft.salary_range(),
            skills: SKILL_CATALOG
                .iter()
                .map(|name| SkillChip {
                    name: (*name).to_string(),
                    selected: draft.has_skill(name),
                })
                .collect(),
            remote: draft.remote_only(),
            active_count: draft.active_count(),
            active_labels: draft.active_labels(),
        },
        jobs,
        loading,
        error,
        action_error: list.action_error().map(str::to_owned),
        show_more,
        empty_notice,
        detail: list.selected_job().cloned(),
    }
}
