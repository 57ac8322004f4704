//! Per-user status channel: a long-lived `text/event-stream` request that
//! carries resume processing events, reconnecting with capped backoff.
use std::sync::mpsc;
use std::time::Duration;

use futures_util::StreamExt;
use jobdash_core::{ChannelState, SessionId, UserId};
use jobdash_logging::{dash_debug, dash_info, dash_warn};
use reqwest::header::ACCEPT;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::api::{endpoint_url, map_reqwest_error};
use crate::backoff::BackoffPolicy;
use crate::sse::SseDecoder;
use crate::wire::decode_push_event;
use crate::{ApiError, EngineEvent, FailureKind};

#[derive(Debug, Clone)]
pub struct PushSettings {
    pub namespace: String,
    pub connect_timeout: Duration,
    pub backoff: BackoffPolicy,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            namespace: "/resume".to_string(),
            connect_timeout: Duration::from_secs(10),
            backoff: BackoffPolicy::default(),
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// `{base}{namespace}/events?userId=<id>`
pub fn status_channel_url(
    base_url: &str,
    settings: &PushSettings,
    user_id: &UserId,
) -> Result<Url, ApiError> {
    let path = format!("{}/events", settings.namespace.trim_end_matches('/'));
    let mut url = endpoint_url(base_url, &path)?;
    url.query_pairs_mut().append_pair("userId", user_id.as_str());
    Ok(url)
}

/// The status stream must not carry a whole-request timeout.
pub fn status_client(settings: &PushSettings) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .build()
        .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))
}

/// Runs until `cancel` fires, then reports [`ChannelState::Closed`].
///
/// Each lost or refused connection is retried after `backoff.delay(n)`,
/// where `n` counts failures since the last successful connect. State
/// changes carry `session` so a replaced channel's last words can be told apart.
pub async fn run_status_channel(
    client: reqwest::Client,
    url: Url,
    backoff: BackoffPolicy,
    session: SessionId,
    sink: &dyn EventSink,
    cancel: CancellationToken,
) {
    let report = |state: ChannelState| sink.emit(EngineEvent::Channel { session, state });
    let mut failures: u32 = 0;
    loop {
        report(if failures == 0 {
            ChannelState::Connecting
        } else {
            ChannelState::Reconnecting { attempt: failures }
        });

        let mut connected = false;
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = read_stream(&client, &url, sink, &report, &mut connected) => outcome,
        };
        match outcome {
            Ok(()) => dash_info!("Status channel stream ended"),
            Err(err) => dash_warn!("Status channel dropped: {}", err),
        }
        if connected {
            failures = 0;
        }
        let delay = backoff.delay(failures);
        failures = failures.saturating_add(1);
        dash_debug!("Status channel reconnect {} in {:?}", failures, delay);

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
    report(ChannelState::Closed);
}

async fn read_stream(
    client: &reqwest::Client,
    url: &Url,
    sink: &dyn EventSink,
    report: &(dyn Fn(ChannelState) + Sync),
    connected: &mut bool,
) -> Result<(), ApiError> {
    let response = client
        .get(url.clone())
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    *connected = true;
    report(ChannelState::Connected);

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        for frame in decoder.push(&chunk) {
            match decode_push_event(&frame.event, &frame.data) {
                Ok(event) => sink.emit(EngineEvent::Push(event)),
                Err(err) => dash_warn!("Skipping status frame `{}`: {}", frame.event, err),
            }
        }
    }
    Ok(())
}
