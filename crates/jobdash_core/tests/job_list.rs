use std::sync::Once;
use std::time::Duration;

use jobdash_core::{
    update, ActionKind, AppState, Effect, Job, JobAction, JobFilter, JobId, JobPage, Msg,
    RequestId, Screen, StatsCounts, UserId, UserJobActions,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobdash_logging::initialize_for_tests);
}

fn user() -> UserId {
    UserId::new("user_1")
}

fn job(id: &str, title: &str) -> Job {
    Job {
        id: JobId::new(id),
        title: title.to_string(),
        company: "TechCorp".to_string(),
        location: "Remote".to_string(),
        salary: "$120k - $150k".to_string(),
        tags: vec!["React".to_string()],
        match_percentage: Some(95),
        posted: "2 days ago".to_string(),
        ..Job::default()
    }
}

fn fetch_requests(effects: &[Effect]) -> Vec<(RequestId, u32, JobFilter)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchJobs {
                request_id,
                page,
                filter,
                ..
            } => Some((*request_id, *page, filter.clone())),
            _ => None,
        })
        .collect()
}

/// Signed in with a resume on file; returns the id of the first page request.
fn job_view() -> (AppState, RequestId) {
    let (state, _) = update(AppState::new(), Msg::UserSignedIn(user()));
    let (state, effects) = update(
        state,
        Msg::ResumeChecked {
            session: 1,
            result: Ok(true),
        },
    );
    let requests = fetch_requests(&effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].1, 1);
    (state, requests[0].0)
}

fn loaded(state: AppState, request_id: RequestId, jobs: Vec<Job>, has_more: bool) -> AppState {
    let (state, _) = update(
        state,
        Msg::JobsLoaded {
            request_id,
            result: Ok(JobPage { jobs, has_more }),
        },
    );
    state
}

fn jobs_view(state: &AppState) -> jobdash_core::JobsView {
    match state.view().screen {
        Screen::Jobs(view) => view,
        other => panic!("job view expected, got {other:?}"),
    }
}

#[test]
fn resume_present_mounts_job_view_with_fresh_fetches() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::UserSignedIn(user()));
    let (state, effects) = update(
        state,
        Msg::ResumeChecked {
            session: 1,
            result: Ok(true),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::FetchJobs {
                request_id: 1,
                user_id: user(),
                page: 1,
                limit: 10,
                filter: JobFilter::default(),
            },
            Effect::FetchBookmarks {
                session: 1,
                user_id: user(),
            },
            Effect::FetchStats {
                session: 1,
                user_id: user(),
                delay: Duration::ZERO,
            },
        ]
    );
    assert!(jobs_view(&state).loading);
}

#[test]
fn late_negative_check_does_not_hide_jobs() {
    init_logging();
    let (state, _) = job_view();
    let (state, effects) = update(
        state,
        Msg::ResumeChecked {
            session: 1,
            result: Ok(false),
        },
    );
    assert!(effects.is_empty());
    assert!(matches!(state.view().screen, Screen::Jobs(_)));
}

#[test]
fn show_more_follows_has_more() {
    init_logging();
    let (state, request_id) = job_view();
    let state = loaded(state, request_id, vec![job("1", "Frontend")], true);
    assert!(jobs_view(&state).show_more);

    let (state, effects) = update(state, Msg::ScrolledToBottom);
    let requests = fetch_requests(&effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].1, 2);

    // Scrolling again while the page is in flight does nothing.
    let (state, effects) = update(state, Msg::LoadMoreClicked);
    assert!(effects.is_empty());

    let state = loaded(state, requests[0].0, vec![job("2", "Backend")], false);
    let view = jobs_view(&state);
    assert_eq!(view.jobs.len(), 2);
    assert!(!view.show_more);

    let (_state, effects) = update(state, Msg::LoadMoreClicked);
    assert!(effects.is_empty());
}

#[test]
fn filter_change_in_flight_keeps_only_latest_results() {
    init_logging();
    let (state, first) = job_view();

    let (state, _) = update(state, Msg::FilterSkillToggled("React".to_string()));
    let (state, _) = update(state, Msg::FilterRemoteChanged(true));
    let (state, effects) = update(state, Msg::FiltersApplied);
    let requests = fetch_requests(&effects);
    assert_eq!(requests.len(), 1);
    let (second, page, filter) = requests[0].clone();
    assert_eq!(page, 1);
    assert_eq!(filter.skills(), ["React".to_string()]);
    assert!(filter.remote_only());

    // Newer response first, the superseded one afterwards.
    let state = loaded(state, second, vec![job("10", "Remote React")], false);
    let state = loaded(state, first, vec![job("1", "Stale")], true);

    let view = jobs_view(&state);
    let titles: Vec<&str> = view.jobs.iter().map(|row| row.title.as_str()).collect();
    assert_eq!(titles, vec!["Remote React"]);
    assert!(!view.show_more);
    assert_eq!(view.filter.active_count, 2);
}

#[test]
fn filter_change_replaces_loaded_pages() {
    init_logging();
    let (state, first) = job_view();
    let state = loaded(state, first, vec![job("1", "A"), job("2", "B")], true);

    let (state, effects) = update(state, Msg::FiltersReset);
    assert_eq!(fetch_requests(&effects)[0].1, 1);
    let view = jobs_view(&state);
    assert!(view.jobs.is_empty());
    assert!(view.loading);
}

#[test]
fn empty_result_shows_notice() {
    init_logging();
    let (state, first) = job_view();
    let state = loaded(state, first, Vec::new(), false);
    let view = jobs_view(&state);
    assert!(view.empty_notice);
    assert!(!view.show_more);
}

#[test]
fn fetch_error_waits_for_manual_retry() {
    init_logging();
    let (state, first) = job_view();
    let (state, _) = update(
        state,
        Msg::JobsLoaded {
            request_id: first,
            result: Err("http status 502".to_string()),
        },
    );
    let view = jobs_view(&state);
    assert_eq!(view.error.as_deref(), Some("http status 502"));
    assert!(!view.empty_notice);

    let (state, effects) = update(state, Msg::ScrolledToBottom);
    assert!(effects.is_empty());

    let (_state, effects) = update(state, Msg::RetryJobsClicked);
    assert_eq!(fetch_requests(&effects)[0].1, 1);
}

#[test]
fn save_success_publishes_stats_change_and_refetches_after_delay() {
    init_logging();
    let (state, first) = job_view();
    let state = loaded(state, first, vec![job("42", "Frontend")], false);

    let (state, effects) = update(
        state,
        Msg::ToggleClicked {
            kind: ActionKind::Saved,
            job_id: JobId::new("42"),
        },
    );
    let action_id = match effects.as_slice() {
        [Effect::SubmitJobAction {
            action_id,
            job_id,
            action,
            ..
        }] => {
            assert_eq!(job_id, &JobId::new("42"));
            assert_eq!(*action, JobAction::Save);
            *action_id
        }
        other => panic!("unexpected effects {other:?}"),
    };
    assert!(jobs_view(&state).jobs[0].saved);

    let (state, effects) = update(
        state,
        Msg::JobActionFinished {
            action_id,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::PublishStatsChanged]);
    assert!(state.jobs().is_marked(ActionKind::Saved, &JobId::new("42")));

    let (state, effects) = update(state, Msg::StatsChanged);
    assert_eq!(
        effects,
        vec![Effect::FetchStats {
            session: 1,
            user_id: user(),
            delay: Duration::from_millis(300),
        }]
    );

    let (state, _) = update(
        state,
        Msg::StatsLoaded {
            session: 1,
            result: Ok(StatsCounts {
                saved: 1,
                applied: 0,
            }),
        },
    );
    let stats = state.view().stats.expect("stats widget");
    assert_eq!(stats.counts.saved, 1);
    assert!(!stats.loading);
}

#[test]
fn failed_apply_rolls_back_and_reports() {
    init_logging();
    let (state, first) = job_view();
    let state = loaded(state, first, vec![job("7", "Data")], false);
    let (state, effects) = update(
        state,
        Msg::ToggleClicked {
            kind: ActionKind::Applied,
            job_id: JobId::new("7"),
        },
    );
    let Some(Effect::SubmitJobAction { action_id, .. }) = effects.first().cloned() else {
        panic!("action effect expected");
    };

    let (state, effects) = update(
        state,
        Msg::JobActionFinished {
            action_id,
            result: Err("http status 500".to_string()),
        },
    );
    assert!(effects.is_empty());
    let view = jobs_view(&state);
    assert!(!view.jobs[0].applied);
    assert_eq!(view.action_error.as_deref(), Some("http status 500"));
}

#[test]
fn bookmarks_snapshot_marks_rows() {
    init_logging();
    let (state, first) = job_view();
    let state = loaded(state, first, vec![job("1", "A"), job("2", "B")], false);
    let (state, _) = update(
        state,
        Msg::BookmarksLoaded {
            session: 1,
            result: Ok(UserJobActions {
                saved: vec![JobId::new("2")],
                applied: vec![JobId::new("1")],
            }),
        },
    );
    let view = jobs_view(&state);
    assert_eq!(
        view.jobs
            .iter()
            .map(|row| (row.saved, row.applied))
            .collect::<Vec<_>>(),
        vec![(false, true), (true, false)]
    );
}

#[test]
fn detail_panel_opens_and_closes() {
    init_logging();
    let (state, first) = job_view();
    let state = loaded(state, first, vec![job("5", "Designer")], false);

    let (state, _) = update(state, Msg::JobSelected(JobId::new("404")));
    assert!(jobs_view(&state).detail.is_none());

    let (state, _) = update(state, Msg::JobSelected(JobId::new("5")));
    assert_eq!(
        jobs_view(&state).detail.map(|job| job.title),
        Some("Designer".to_string())
    );

    let (state, _) = update(state, Msg::DetailClosed);
    assert!(jobs_view(&state).detail.is_none());
}

#[test]
fn stats_error_is_retried_manually() {
    init_logging();
    let (state, _) = job_view();
    let (state, _) = update(
        state,
        Msg::StatsLoaded {
            session: 1,
            result: Err("network error".to_string()),
        },
    );
    assert_eq!(
        state.view().stats.and_then(|stats| stats.error),
        Some("network error".to_string())
    );

    let (_state, effects) = update(state, Msg::RetryStatsClicked);
    assert_eq!(
        effects,
        vec![Effect::FetchStats {
            session: 1,
            user_id: user(),
            delay: Duration::ZERO,
        }]
    );
}
