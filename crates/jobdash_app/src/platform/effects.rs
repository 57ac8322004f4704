use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

use jobdash_core::{Effect, Msg};
use jobdash_engine::{
    ApiError, BusEvent, EngineConfig, EngineError, EngineEvent, EngineHandle, JobQuery,
};
use jobdash_logging::{dash_debug, dash_info, dash_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(config)?;
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SyncUser { user_id } => self.engine.sync_user(user_id),
                Effect::CheckResume { session, user_id } => {
                    self.engine.check_resume(session, user_id)
                }
                Effect::OpenStatusChannel { session, user_id } => {
                    self.engine.open_status_channel(session, user_id)
                }
                Effect::CloseStatusChannel => self.engine.close_status_channel(),
                Effect::UploadResume {
                    attempt,
                    user_id,
                    file,
                } => {
                    dash_info!(
                        "UploadResume attempt={} file={} kind={:?}",
                        attempt,
                        file.file_name,
                        file.kind
                    );
                    self.engine.upload_resume(attempt, user_id, file);
                }
                Effect::FetchJobs {
                    request_id,
                    user_id,
                    page,
                    limit,
                    filter,
                } => {
                    dash_debug!("FetchJobs request_id={} page={}", request_id, page);
                    self.engine.fetch_jobs(
                        request_id,
                        JobQuery {
                            user_id,
                            page,
                            limit,
                            filter,
                        },
                    );
                }
                Effect::FetchBookmarks { session, user_id } => {
                    self.engine.fetch_bookmarks(session, user_id)
                }
                Effect::SubmitJobAction {
                    action_id,
                    user_id,
                    job_id,
                    action,
                } => self.engine.job_action(action_id, user_id, job_id, action),
                Effect::FetchStats {
                    session,
                    user_id,
                    delay,
                } => self.engine.fetch_stats(session, user_id, delay),
                Effect::PublishStatsChanged => self.engine.publish(BusEvent::StatsChanged),
            }
        }
    }

    /// Closes the status channel and waits for the engine to stop.
    pub fn shutdown(&self) {
        if !self.engine.shutdown(SHUTDOWN_GRACE) {
            dash_warn!("Engine did not stop within {:?}", SHUTDOWN_GRACE);
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UserSynced { result } => Msg::UserSynced(describe("sync-user", result)),
        EngineEvent::ResumeChecked { session, result } => Msg::ResumeChecked {
            session,
            result: describe("check-resume", result),
        },
        EngineEvent::UploadFinished { attempt, result } => Msg::UploadFinished {
            attempt,
            result: describe("upload-resume", result),
        },
        EngineEvent::JobsFetched { request_id, result } => Msg::JobsLoaded {
            request_id,
            result: describe("recommended-jobs", result),
        },
        EngineEvent::BookmarksFetched { session, result } => Msg::BookmarksLoaded {
            session,
            result: describe("user-job-actions", result),
        },
        EngineEvent::JobActionFinished { action_id, result } => Msg::JobActionFinished {
            action_id,
            result: describe("job-action", result),
        },
        EngineEvent::StatsFetched { session, result } => Msg::StatsLoaded {
            session,
            result: describe("job-stats", result),
        },
        EngineEvent::Push(event) => Msg::Push(event),
        EngineEvent::Channel { session, state } => Msg::ChannelStateChanged { session, state },
        EngineEvent::StatsChanged => Msg::StatsChanged,
    }
}

fn describe<T>(endpoint: &str, result: Result<T, ApiError>) -> Result<T, String> {
    result.map_err(|err| {
        dash_warn!("{} failed: {}", endpoint, err);
        err.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdash_core::{ChannelState, JobPage};
    use jobdash_engine::FailureKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn failures_become_display_strings() {
        let msg = map_event(EngineEvent::JobsFetched {
            request_id: 4,
            result: Err(ApiError::new(FailureKind::HttpStatus(502), "502 Bad Gateway")),
        });
        assert_eq!(
            msg,
            Msg::JobsLoaded {
                request_id: 4,
                result: Err("http status 502: 502 Bad Gateway".to_string()),
            }
        );
    }

    #[test]
    fn successes_and_signals_pass_through() {
        assert_eq!(
            map_event(EngineEvent::JobsFetched {
                request_id: 1,
                result: Ok(JobPage::default()),
            }),
            Msg::JobsLoaded {
                request_id: 1,
                result: Ok(JobPage::default()),
            }
        );
        assert_eq!(map_event(EngineEvent::StatsChanged), Msg::StatsChanged);
        assert_eq!(
            map_event(EngineEvent::Channel {
                session: 3,
                state: ChannelState::Connected,
            }),
            Msg::ChannelStateChanged {
                session: 3,
                state: ChannelState::Connected,
            }
        );
    }

    #[test]
    fn session_tags_survive_mapping() {
        assert_eq!(
            map_event(EngineEvent::ResumeChecked {
                session: 2,
                result: Ok(true),
            }),
            Msg::ResumeChecked {
                session: 2,
                result: Ok(true),
            }
        );
        assert_eq!(
            map_event(EngineEvent::StatsFetched {
                session: 5,
                result: Err(ApiError::new(FailureKind::Timeout, "")),
            }),
            Msg::StatsLoaded {
                session: 5,
                result: Err("timeout".to_string()),
            }
        );
    }
}
