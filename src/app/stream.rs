// BotConsole - app/stream.rs
//
// Live log stream transport: consumes the backend's server-sent-events
// endpoint on a background thread and forwards tagged events to the UI.
//
// Architecture:
//   - `StreamManager` lives on the UI thread and implements
//     `StreamTransport`; the viewer asks it to connect/disconnect.
//   - Each subscription runs `run_stream` on its own thread, driving a
//     current-thread tokio runtime. The session future races a oneshot stop
//     signal; on cancel the future (and with it the response and its socket)
//     is dropped immediately, whether it is connecting or waiting for bytes.
//   - Events are sent as `StreamEvent { subscription, kind }` over a single
//     mpsc channel; the UI thread polls it each frame (same pattern as the
//     other background managers).
//
// Failure handling:
//   - Connect failures, non-2xx status, read errors and EOF all end the
//     subscription with exactly one `Error` event. The transport never
//     resumes on its own; the viewer decides whether to retry.
//   - A cancelled subscription never emits again: the cancel flag is checked
//     before every send, and the viewer drops stale ids regardless.

use crate::core::model::{StreamEvent, StreamEventKind, SubscriptionId};
use crate::core::sse::SseDecoder;
use crate::core::viewer::StreamTransport;
use crate::util::constants::{
    HTTP_CONNECT_TIMEOUT_SECS, LOG_STREAM_PATH, MAX_SSE_LINE_BYTES, MAX_STREAM_EVENTS_PER_FRAME,
};
use crate::util::error::StreamError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::sync::oneshot;

// =============================================================================
// StreamManager
// =============================================================================

/// Handle on the running subscription thread.
struct ActiveStream {
    id: SubscriptionId,
    cancelled: Arc<AtomicBool>,
    stop: oneshot::Sender<()>,
}

/// Owns the background stream thread for the current subscription.
pub struct StreamManager {
    url: String,
    tx: mpsc::Sender<StreamEvent>,
    rx: mpsc::Receiver<StreamEvent>,
    /// The subscription currently allowed to run.
    active: Option<ActiveStream>,
}

impl StreamManager {
    /// Create a manager for the backend at `base_url`.
    pub fn new(base_url: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            url: stream_url(base_url),
            tx,
            rx,
            active: None,
        }
    }

    /// Full URL of the log stream endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` while a subscription thread is allowed to deliver.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Drain queued events without blocking, up to the per-frame budget.
    pub fn poll_events(&self) -> Vec<StreamEvent> {
        self.rx
            .try_iter()
            .take(MAX_STREAM_EVENTS_PER_FRAME)
            .collect()
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancelled.store(true, Ordering::SeqCst);
            // The thread may already have finished; nothing to stop then.
            let _ = active.stop.send(());
            tracing::debug!(subscription = %active.id, "Stream subscription cancelled");
        }
    }
}

impl StreamTransport for StreamManager {
    fn connect(&mut self, id: SubscriptionId) {
        self.cancel_active();

        let cancelled = Arc::new(AtomicBool::new(false));
        let (stop, stop_rx) = oneshot::channel();
        self.active = Some(ActiveStream {
            id,
            cancelled: Arc::clone(&cancelled),
            stop,
        });

        let url = self.url.clone();
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("log-stream-{}", id.0))
            .spawn(move || run_stream(id, url, tx, cancelled, stop_rx));

        match spawned {
            Ok(_) => tracing::info!(subscription = %id, url = %self.url, "Live log stream connecting"),
            Err(e) => {
                tracing::error!(error = %e, "Cannot spawn log stream thread");
                // Report through the normal path so the viewer schedules a retry.
                let _ = self.tx.send(StreamEvent {
                    subscription: id,
                    kind: StreamEventKind::Error(format!("cannot start stream thread: {e}")),
                });
            }
        }
    }

    fn disconnect(&mut self, id: SubscriptionId) {
        if matches!(&self.active, Some(active) if active.id == id) {
            self.cancel_active();
        }
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

/// Join the base URL and the stream path without doubling the slash.
pub fn stream_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), LOG_STREAM_PATH)
}

// =============================================================================
// Background stream thread
// =============================================================================

fn run_stream(
    id: SubscriptionId,
    url: String,
    tx: mpsc::Sender<StreamEvent>,
    cancelled: Arc<AtomicBool>,
    mut stop: oneshot::Receiver<()>,
) {
    // Returns false once the subscription is cancelled or the UI is gone.
    let emit = |kind: StreamEventKind| -> bool {
        if cancelled.load(Ordering::SeqCst) {
            return false;
        }
        tx.send(StreamEvent {
            subscription: id,
            kind,
        })
        .is_ok()
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| StreamError::Runtime { source });

    let result = runtime.and_then(|rt| {
        rt.block_on(async {
            tokio::select! {
                // Fires on an explicit stop and when the manager is dropped.
                _ = &mut stop => Ok(()),
                result = stream_session(&url, &emit) => result,
            }
        })
    });

    match result {
        Ok(()) if cancelled.load(Ordering::SeqCst) => {
            tracing::debug!(subscription = %id, "Stream thread exiting after cancel");
        }
        Ok(()) => {
            tracing::debug!(subscription = %id, "Stream thread exiting: UI channel closed");
        }
        Err(e) => {
            tracing::warn!(subscription = %id, error = %e, "Live log stream ended");
            emit(StreamEventKind::Error(e.to_string()));
        }
    }
}

/// Connect, announce `Opened`, then forward every message until the stream
/// fails or `emit` refuses. Returning drops the response and its socket.
async fn stream_session<F>(url: &str, emit: &F) -> Result<(), StreamError>
where
    F: Fn(StreamEventKind) -> bool,
{
    let mut response = open_stream(url).await?;
    if !emit(StreamEventKind::Opened) {
        return Ok(());
    }

    let mut frames = FrameReader::new();
    loop {
        let chunk = response.chunk().await.map_err(|source| StreamError::Read {
            url: url.to_string(),
            source,
        })?;
        let Some(chunk) = chunk else {
            frames.finish();
            return Err(StreamError::Closed {
                url: url.to_string(),
            });
        };
        if !frames.feed(&chunk, |data| emit(StreamEventKind::Message(data))) {
            return Ok(());
        }
    }
}

/// Issue the stream request and check the status.
async fn open_stream(url: &str) -> Result<reqwest::Response, StreamError> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .build()
        .map_err(|source| StreamError::Client { source })?;

    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(|source| StreamError::Connect {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

// =============================================================================
// Body framing
// =============================================================================

/// Splits raw body chunks into lines and feeds them to an `SseDecoder`.
///
/// Each line keeps at most `MAX_SSE_LINE_BYTES`; the rest of an oversized
/// line is dropped up to its newline. Invalid UTF-8 is decoded lossily.
#[derive(Debug, Default)]
pub struct FrameReader {
    line: Vec<u8>,
    decoder: SseDecoder,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk, calling `on_data` for every completed default-type
    /// event. Returns `false` as soon as `on_data` does.
    pub fn feed<F>(&mut self, chunk: &[u8], mut on_data: F) -> bool
    where
        F: FnMut(String) -> bool,
    {
        let mut rest = chunk;
        while !rest.is_empty() {
            let (part, done) = match rest.iter().position(|&b| b == b'\n') {
                Some(pos) => (&rest[..pos], true),
                None => (rest, false),
            };
            let room = MAX_SSE_LINE_BYTES.saturating_sub(self.line.len());
            self.line.extend_from_slice(&part[..part.len().min(room)]);
            if !done {
                break;
            }
            rest = &rest[part.len() + 1..];

            let line = String::from_utf8_lossy(&self.line).into_owned();
            self.line.clear();
            if let Some(data) = self.decoder.push_line(&line) {
                tracing::trace!(
                    payload = crate::util::logging::preview(&data),
                    "Stream frame received"
                );
                if !on_data(data) {
                    return false;
                }
            }
        }
        true
    }

    /// Discard any partial line and event at end of stream.
    pub fn finish(&mut self) {
        self.line.clear();
        self.decoder.finish();
    }
}
