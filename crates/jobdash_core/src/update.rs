use std::time::Duration;

use jobdash_logging::{dash_debug, dash_info, dash_warn};

use crate::jobs::PageRequest;
use crate::state::ResumeGate;
use crate::upload::UploadSignal;
use crate::{AppState, Effect, JobFilter, Msg, PushEvent};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let (changed, effects) = match msg {
        Msg::UserSignedIn(user_id) => {
            if state.user.as_ref() == Some(&user_id) {
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(4);
            if state.user.is_some() {
                state.end_session();
                effects.push(Effect::CloseStatusChannel);
            }
            dash_info!("User {} signed in; checking resume", user_id);
            state.session += 1;
            let session = state.session;
            state.user = Some(user_id.clone());
            state.gate = ResumeGate::Checking;
            effects.push(Effect::SyncUser {
                user_id: user_id.clone(),
            });
            effects.push(Effect::CheckResume {
                session,
                user_id: user_id.clone(),
            });
            effects.push(Effect::OpenStatusChannel { session, user_id });
            (true, effects)
        }
        Msg::UserSignedOut => {
            if state.user.is_none() {
                return (state, Vec::new());
            }
            state.end_session();
            (true, vec![Effect::CloseStatusChannel])
        }
        Msg::UserSynced(result) => {
            if let Err(err) = result {
                dash_warn!("User sync failed: {}", err);
            }
            (false, Vec::new())
        }
        Msg::ResumeChecked { session, result } => {
            if !state.is_current(session) {
                dash_debug!("Dropping resume check from session {}", session);
                return (state, Vec::new());
            }
            if state.gate != ResumeGate::Checking {
                return (state, Vec::new());
            }
            match result {
                Ok(true) => (true, mount_job_view(&mut state)),
                Ok(false) => {
                    state.gate = ResumeGate::Missing;
                    (true, Vec::new())
                }
                Err(err) => {
                    dash_warn!("Resume check failed, showing upload form: {}", err);
                    state.gate = ResumeGate::Missing;
                    (true, Vec::new())
                }
            }
        }
        Msg::ResumeFileSelected { path, mime } => {
            if !state.upload_visible() {
                return (state, Vec::new());
            }
            (state.upload.select_file(&path, mime.as_deref()), Vec::new())
        }
        Msg::UploadSubmitted => {
            let Some(user_id) = state.user.clone() else {
                return (state, Vec::new());
            };
            if !state.upload_visible() {
                return (state, Vec::new());
            }
            match state.upload.submit() {
                Some((attempt, file)) => {
                    dash_info!("Uploading {} (attempt {})", file.file_name, attempt);
                    (
                        true,
                        vec![Effect::UploadResume {
                            attempt,
                            user_id,
                            file,
                        }],
                    )
                }
                // A missing file sets an inline message.
                None => (true, Vec::new()),
            }
        }
        Msg::UploadFinished { attempt, result } => {
            if let Err(err) = &result {
                dash_warn!("Resume upload attempt {} rejected: {}", attempt, err);
            }
            (state.upload.transport_finished(attempt, result), Vec::new())
        }
        Msg::UploadRetryClicked => (state.upload.retry(), Vec::new()),
        Msg::UploadDialogOpened => {
            if state.gate != ResumeGate::Ready || state.upload_dialog_open {
                return (state, Vec::new());
            }
            if !state.upload.phase().is_busy() {
                state.upload.reset();
            }
            state.upload_dialog_open = true;
            (true, Vec::new())
        }
        Msg::UploadDialogClosed => (std::mem::take(&mut state.upload_dialog_open), Vec::new()),
        Msg::Push(event) => apply_push(&mut state, event),
        Msg::ChannelStateChanged {
            session,
            state: channel,
        } => {
            if !state.is_current(session) {
                return (state, Vec::new());
            }
            let changed = state.channel != channel;
            state.channel = channel;
            (changed, Vec::new())
        }
        Msg::FilterSkillToggled(skill) => {
            state.draft_filter.toggle_skill(&skill);
            (true, Vec::new())
        }
        Msg::FilterSalaryChanged { lower, upper } => {
            state.draft_filter.set_salary_range(lower, upper);
            (true, Vec::new())
        }
        Msg::FilterRemoteChanged(remote) => {
            state.draft_filter.set_remote_only(remote);
            (true, Vec::new())
        }
        Msg::FiltersApplied => {
            let filter = state.draft_filter.clone();
            (true, reload_jobs(&mut state, filter))
        }
        Msg::FiltersReset => {
            state.draft_filter = JobFilter::default();
            (true, reload_jobs(&mut state, JobFilter::default()))
        }
        Msg::JobsLoaded { request_id, result } => {
            let applied = state.list.page_loaded(request_id, result);
            if !applied {
                dash_debug!("Dropping stale job page response {}", request_id);
            }
            (applied, Vec::new())
        }
        Msg::LoadMoreClicked | Msg::ScrolledToBottom => {
            if state.gate != ResumeGate::Ready {
                return (state, Vec::new());
            }
            let request = state.list.load_more();
            match request {
                Some(request) => {
                    let effects = fetch_jobs(&state, request);
                    (true, effects)
                }
                None => (false, Vec::new()),
            }
        }
        Msg::RetryJobsClicked => {
            if state.gate != ResumeGate::Ready {
                return (state, Vec::new());
            }
            match state.list.retry() {
                Some(request) => {
                    let effects = fetch_jobs(&state, request);
                    (true, effects)
                }
                None => (false, Vec::new()),
            }
        }
        Msg::BookmarksLoaded { session, .. } if !state.is_current(session) => {
            dash_debug!("Dropping bookmarks from session {}", session);
            (false, Vec::new())
        }
        Msg::BookmarksLoaded { result, .. } => match result {
            Ok(actions) if state.gate == ResumeGate::Ready => {
                state.list.bookmarks_loaded(actions.saved, actions.applied);
                (true, Vec::new())
            }
            Ok(_) => (false, Vec::new()),
            Err(err) => {
                dash_warn!("Loading saved/applied jobs failed: {}", err);
                (false, Vec::new())
            }
        },
        Msg::ToggleClicked { kind, job_id } => {
            let Some(user_id) = state.user.clone() else {
                return (state, Vec::new());
            };
            if state.gate != ResumeGate::Ready {
                return (state, Vec::new());
            }
            let (action_id, action) = state.list.toggle(kind, job_id.clone());
            (
                true,
                vec![Effect::SubmitJobAction {
                    action_id,
                    user_id,
                    job_id,
                    action,
                }],
            )
        }
        Msg::JobActionFinished { action_id, result } => {
            if let Err(err) = &result {
                dash_warn!("Job action {} failed, rolling back: {}", action_id, err);
            }
            let confirmed = state.list.action_finished(action_id, result);
            let effects = if confirmed {
                vec![Effect::PublishStatsChanged]
            } else {
                Vec::new()
            };
            (true, effects)
        }
        Msg::JobSelected(job_id) => (state.list.select(job_id), Vec::new()),
        Msg::DetailClosed => (state.list.close_detail(), Vec::new()),
        Msg::StatsChanged => {
            let delay = state.settings.stats_refresh_delay;
            fetch_stats(&mut state, delay)
        }
        Msg::RetryStatsClicked => fetch_stats(&mut state, Duration::ZERO),
        Msg::StatsLoaded { session, result } => {
            if !state.is_current(session) || state.gate != ResumeGate::Ready {
                return (state, Vec::new());
            }
            state.stats.loaded(result);
            (true, Vec::new())
        }
        Msg::Tick | Msg::NoOp => (false, Vec::new()),
    };

    if changed {
        state.mark_dirty();
    }
    (state, effects)
}

fn apply_push(state: &mut AppState, event: PushEvent) -> (bool, Vec<Effect>) {
    let Some(user_id) = state.user.as_ref() else {
        return (false, Vec::new());
    };
    if event.user_id() != user_id {
        dash_debug!("Ignoring status event for another user");
        return (false, Vec::new());
    }

    let (changed, signal) = state.upload.apply_event(&event);
    let processed_ok = matches!(event, PushEvent::Processed { success: true, .. });

    if signal == UploadSignal::ResumeReady {
        return (true, resume_ready(state));
    }
    // The dashboard listens for processed results on its own, so a resume
    // finished elsewhere still opens the job view.
    if processed_ok && matches!(state.gate, ResumeGate::Checking | ResumeGate::Missing) {
        return (true, mount_job_view(state));
    }
    (changed, Vec::new())
}

/// Upload finished successfully: open the job view, or reload it for a re-upload.
fn resume_ready(state: &mut AppState) -> Vec<Effect> {
    match state.gate {
        ResumeGate::SignedOut => Vec::new(),
        ResumeGate::Checking | ResumeGate::Missing | ResumeGate::Ready => {
            state.upload_dialog_open = false;
            mount_job_view(state)
        }
    }
}

/// Shows the job view and loads it from scratch.
fn mount_job_view(state: &mut AppState) -> Vec<Effect> {
    let Some(user_id) = state.user.clone() else {
        return Vec::new();
    };
    if state.gate != ResumeGate::Ready {
        dash_info!("Resume available for {}; showing jobs", user_id);
    }
    state.gate = ResumeGate::Ready;
    state.generation += 1;
    let filter = state.list.filter().clone();
    let request = state.list.reload(filter);
    state.stats.begin_fetch();

    let mut effects = fetch_jobs(state, request);
    effects.push(Effect::FetchBookmarks {
        session: state.session,
        user_id: user_id.clone(),
    });
    effects.push(Effect::FetchStats {
        session: state.session,
        user_id,
        delay: Duration::ZERO,
    });
    effects
}

fn reload_jobs(state: &mut AppState, filter: JobFilter) -> Vec<Effect> {
    if state.gate != ResumeGate::Ready {
        return Vec::new();
    }
    let request = state.list.reload(filter);
    fetch_jobs(state, request)
}

fn fetch_jobs(state: &AppState, request: PageRequest) -> Vec<Effect> {
    let Some(user_id) = state.user.clone() else {
        return Vec::new();
    };
    vec![Effect::FetchJobs {
        request_id: request.request_id,
        user_id,
        page: request.page,
        limit: state.settings.page_size,
        filter: request.filter,
    }]
}

fn fetch_stats(state: &mut AppState, delay: Duration) -> (bool, Vec<Effect>) {
    if state.gate != ResumeGate::Ready {
        return (false, Vec::new());
    }
    let Some(user_id) = state.user.clone() else {
        return (false, Vec::new());
    };
    state.stats.begin_fetch();
    (
        true,
        vec![Effect::FetchStats {
            session: state.session,
            user_id,
            delay,
        }],
    )
}
