use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use jobdash_core::{
    ActionId, AttemptId, JobAction, JobId, RequestId, SelectedResume, SessionId, UserId,
};
use jobdash_logging::{dash_debug, dash_info, dash_warn};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiSettings, DashboardApi, JobQuery, ReqwestApi, ResumeUpload};
use crate::bus::{BusEvent, EventBus};
use crate::push::{
    run_status_channel, status_channel_url, status_client, ChannelEventSink, PushSettings,
};
use crate::{EngineError, EngineEvent};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub push: PushSettings,
}

enum EngineCommand {
    Request(Request),
    OpenStatusChannel {
        session: SessionId,
        user_id: UserId,
    },
    CloseStatusChannel,
    /// Close the channel, acknowledge, and stop the worker.
    Shutdown { done: mpsc::Sender<()> },
}

/// One-shot API calls; each produces exactly one [`EngineEvent`].
enum Request {
    SyncUser {
        user_id: UserId,
    },
    CheckResume {
        session: SessionId,
        user_id: UserId,
    },
    Upload {
        attempt: AttemptId,
        user_id: UserId,
        file: SelectedResume,
    },
    FetchJobs {
        request_id: RequestId,
        query: JobQuery,
    },
    FetchBookmarks {
        session: SessionId,
        user_id: UserId,
    },
    JobAction {
        action_id: ActionId,
        user_id: UserId,
        job_id: JobId,
        action: JobAction,
    },
    FetchStats {
        session: SessionId,
        user_id: UserId,
        delay: Duration,
    },
}

/// Owns a tokio runtime on a dedicated thread. Requests go in as commands,
/// results come back as [`EngineEvent`]s through [`EngineHandle::try_recv`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    bus: EventBus,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api = ReqwestApi::new(&config.api).map_err(EngineError::Client)?;
        Self::with_api(config, Arc::new(api))
    }

    /// Same as [`EngineHandle::new`] with a caller-supplied API client.
    pub fn with_api(config: EngineConfig, api: Arc<dyn DashboardApi>) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let push_client = status_client(&config.push).map_err(EngineError::Client)?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let bus = EventBus::default();

        runtime.spawn(forward_bus(bus.subscribe(), event_tx.clone()));

        let worker = Worker {
            api,
            config,
            push_client,
            event_tx,
            status_channel: None,
        };
        thread::spawn(move || worker.run(runtime, cmd_rx));

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            bus,
        })
    }

    pub fn sync_user(&self, user_id: UserId) {
        self.request(Request::SyncUser { user_id });
    }

    pub fn check_resume(&self, session: SessionId, user_id: UserId) {
        self.request(Request::CheckResume { session, user_id });
    }

    pub fn upload_resume(&self, attempt: AttemptId, user_id: UserId, file: SelectedResume) {
        self.request(Request::Upload {
            attempt,
            user_id,
            file,
        });
    }

    pub fn fetch_jobs(&self, request_id: RequestId, query: JobQuery) {
        self.request(Request::FetchJobs { request_id, query });
    }

    pub fn fetch_bookmarks(&self, session: SessionId, user_id: UserId) {
        self.request(Request::FetchBookmarks { session, user_id });
    }

    pub fn job_action(&self, action_id: ActionId, user_id: UserId, job_id: JobId, action: JobAction) {
        self.request(Request::JobAction {
            action_id,
            user_id,
            job_id,
            action,
        });
    }

    /// Waits `delay` before fetching so the server can settle a just-submitted action.
    pub fn fetch_stats(&self, session: SessionId, user_id: UserId, delay: Duration) {
        self.request(Request::FetchStats {
            session,
            user_id,
            delay,
        });
    }

    /// Replaces any open channel; only one user's stream is live at a time.
    /// Its state changes come back tagged with `session`.
    pub fn open_status_channel(&self, session: SessionId, user_id: UserId) {
        self.send(EngineCommand::OpenStatusChannel { session, user_id });
    }

    pub fn close_status_channel(&self) {
        self.send(EngineCommand::CloseStatusChannel);
    }

    /// Closes the status channel and stops the worker. Returns `false` when
    /// the worker did not acknowledge within `timeout`.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let (done_tx, done_rx) = mpsc::channel();
        self.send(EngineCommand::Shutdown { done: done_tx });
        done_rx.recv_timeout(timeout).is_ok()
    }

    pub fn publish(&self, event: BusEvent) {
        self.bus.publish(event);
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    fn request(&self, request: Request) {
        self.send(EngineCommand::Request(request));
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            dash_warn!("Engine worker is gone; command dropped");
        }
    }
}

struct OpenChannel {
    user_id: UserId,
    cancel: CancellationToken,
}

struct Worker {
    api: Arc<dyn DashboardApi>,
    config: EngineConfig,
    push_client: reqwest::Client,
    event_tx: mpsc::Sender<EngineEvent>,
    status_channel: Option<OpenChannel>,
}

impl Worker {
    fn run(mut self, runtime: tokio::runtime::Runtime, cmd_rx: mpsc::Receiver<EngineCommand>) {
        while let Ok(command) = cmd_rx.recv() {
            match command {
                EngineCommand::OpenStatusChannel { session, user_id } => {
                    self.open_channel(&runtime, session, user_id);
                }
                EngineCommand::CloseStatusChannel => self.close_channel(),
                EngineCommand::Shutdown { done } => {
                    self.close_channel();
                    let _ = done.send(());
                    break;
                }
                EngineCommand::Request(request) => {
                    let api = self.api.clone();
                    let event_tx = self.event_tx.clone();
                    runtime.spawn(async move {
                        let event = handle_request(api.as_ref(), request).await;
                        let _ = event_tx.send(event);
                    });
                }
            }
        }
        self.close_channel();
        dash_debug!("Engine worker stopped");
    }

    fn open_channel(
        &mut self,
        runtime: &tokio::runtime::Runtime,
        session: SessionId,
        user_id: UserId,
    ) {
        self.close_channel();
        let url = match status_channel_url(&self.config.api.base_url, &self.config.push, &user_id)
        {
            Ok(url) => url,
            Err(err) => {
                dash_warn!("Cannot open status channel for {}: {}", user_id, err);
                return;
            }
        };
        dash_info!("Opening status channel for {}", user_id);
        let cancel = CancellationToken::new();
        let client = self.push_client.clone();
        let backoff = self.config.push.backoff;
        let sink = ChannelEventSink::new(self.event_tx.clone());
        let token = cancel.clone();
        runtime.spawn(async move {
            run_status_channel(client, url, backoff, session, &sink, token).await;
        });
        self.status_channel = Some(OpenChannel { user_id, cancel });
    }

    fn close_channel(&mut self) {
        if let Some(channel) = self.status_channel.take() {
            dash_info!("Closing status channel for {}", channel.user_id);
            channel.cancel.cancel();
        }
    }
}

async fn handle_request(api: &dyn DashboardApi, request: Request) -> EngineEvent {
    match request {
        Request::SyncUser { user_id } => EngineEvent::UserSynced {
            result: api.sync_user(&user_id).await,
        },
        Request::CheckResume { session, user_id } => EngineEvent::ResumeChecked {
            session,
            result: api.check_resume(&user_id).await,
        },
        Request::Upload {
            attempt,
            user_id,
            file,
        } => {
            let result = match ResumeUpload::read(&file).await {
                Ok(upload) => api.upload_resume(&user_id, upload).await,
                Err(err) => Err(err),
            };
            EngineEvent::UploadFinished { attempt, result }
        }
        Request::FetchJobs { request_id, query } => EngineEvent::JobsFetched {
            request_id,
            result: api.recommended_jobs(&query).await,
        },
        Request::FetchBookmarks { session, user_id } => EngineEvent::BookmarksFetched {
            session,
            result: api.user_job_actions(&user_id).await,
        },
        Request::JobAction {
            action_id,
            user_id,
            job_id,
            action,
        } => EngineEvent::JobActionFinished {
            action_id,
            result: api.job_action(&user_id, &job_id, action).await,
        },
        Request::FetchStats {
            session,
            user_id,
            delay,
        } => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            EngineEvent::StatsFetched {
                session,
                result: api.job_stats(&user_id).await,
            }
        }
    }
}

async fn forward_bus(
    mut rx: tokio::sync::broadcast::Receiver<BusEvent>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(BusEvent::StatsChanged) => {
                if event_tx.send(EngineEvent::StatsChanged).is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                dash_debug!("Bus subscriber skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
