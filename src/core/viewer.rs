// BotConsole - core/viewer.rs
//
// Live log stream viewer: bounded buffer, one subscription, fixed-delay
// reconnect. Pure state machine: no threads, no clocks, no UI. Time is passed
// in by the caller and the transport is reached through `StreamTransport`, so
// every transition is testable without I/O.
//
// Subscription state machine:
//
//   Disconnected --open--> Connecting --Opened--> Connected
//                            |                       |
//                            +------- Error ---------+
//                                       |
//                           (one retry timer, retry_delay)
//                                       |
//                        visible? --yes--> Connecting (fresh subscription)
//                                 --no---> timer dropped
//
//   any state --close--> Disconnected (subscription invalidated, timer cancelled)
//
// Stale-handle guard: every attempt gets a fresh SubscriptionId; events that
// carry any other id are ignored, so a message in flight at close time (or
// from a superseded attempt) can never reach the buffer.

use crate::core::buffer::LogBuffer;
use crate::core::model::{
    ConnectionState, LogEntry, LogLevel, RenderedLine, StreamEvent, StreamEventKind,
    SubscriptionId, ViewerConfig,
};
use crate::core::payload::{self, Payload};
use crate::core::sanitize;
use std::time::{Duration, Instant};

/// The viewer's view of the stream transport.
///
/// `connect` must start delivering events tagged with `id`; `disconnect` must
/// stop delivering them as soon as practical. The viewer never relies on the
/// latter for correctness: stale events are filtered by id.
pub trait StreamTransport {
    fn connect(&mut self, id: SubscriptionId);
    fn disconnect(&mut self, id: SubscriptionId);
}

/// Local notice texts.
pub const NOTICE_READY: &str = "Terminal ready. Press Ctrl+` or the terminal button to open.";
pub const NOTICE_STARTED: &str = "Live log stream started";
pub const NOTICE_STOPPED: &str = "Live log stream stopped";
pub const NOTICE_CLEARED: &str = "Terminal cleared";

/// Live log stream viewer. One instance per window, owned by the UI shell.
#[derive(Debug)]
pub struct LogStreamViewer {
    buffer: LogBuffer,
    config: ViewerConfig,
    state: ConnectionState,
    /// The only subscription whose events are accepted.
    subscription: Option<SubscriptionId>,
    next_subscription: u64,
    /// Deadline of the single pending retry, if any.
    retry_at: Option<Instant>,
    retry_delay: Duration,
    /// Shown (outside the buffer) after `clear()` until the next append.
    cleared_marker: Option<LogEntry>,
    /// Bumped on every buffer or connection-state mutation.
    revision: u64,
    scroll_requested: bool,
}

impl LogStreamViewer {
    /// Create a viewer with the given buffer capacity and reconnect delay.
    /// Appends the initial "ready" notice.
    pub fn new(capacity: usize, retry_delay: Duration) -> Self {
        let mut viewer = Self {
            buffer: LogBuffer::new(capacity),
            config: ViewerConfig::default(),
            state: ConnectionState::Disconnected,
            subscription: None,
            next_subscription: 1,
            retry_at: None,
            retry_delay,
            cleared_marker: None,
            revision: 0,
            scroll_requested: false,
        };
        viewer.append_entry(LogEntry::now(LogLevel::Info, NOTICE_READY));
        viewer
    }

    // -------------------------------------------------------------------------
    // User operations
    // -------------------------------------------------------------------------

    /// Show the terminal and subscribe if not already subscribed.
    pub fn open<T: StreamTransport>(&mut self, transport: &mut T) {
        self.config.visible = true;
        if self.subscription.is_some() {
            tracing::debug!(state = ?self.state, "open: already subscribed");
            return;
        }
        self.subscribe(transport);
    }

    /// Hide the terminal and tear down the subscription and any pending retry.
    pub fn close<T: StreamTransport>(&mut self, transport: &mut T) {
        self.config.visible = false;
        self.config.minimized = false;

        let had_timer = self.retry_at.take().is_some();
        let torn_down = self.subscription.take();
        if let Some(id) = torn_down {
            transport.disconnect(id);
            tracing::info!(subscription = %id, had_timer, "Live log stream closed");
        }

        self.set_state(ConnectionState::Disconnected);
        if torn_down.is_some() {
            self.append_entry(LogEntry::now(LogLevel::Info, NOTICE_STOPPED));
        }
    }

    pub fn toggle<T: StreamTransport>(&mut self, transport: &mut T) {
        if self.config.visible {
            self.close(transport);
        } else {
            self.open(transport);
        }
    }

    pub fn minimize(&mut self) {
        self.config.minimized = !self.config.minimized;
    }

    pub fn toggle_auto_scroll(&mut self) {
        self.config.auto_scroll = !self.config.auto_scroll;
        if self.config.auto_scroll {
            self.scroll_requested = true;
        }
    }

    /// Empty the buffer; the display shows only the cleared marker.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cleared_marker = Some(LogEntry::now(LogLevel::Info, NOTICE_CLEARED));
        self.revision += 1;
    }

    /// Force a fresh subscription attempt, superseding the current one and
    /// any pending retry. Ignored while hidden.
    pub fn reconnect<T: StreamTransport>(&mut self, transport: &mut T) {
        if !self.config.visible {
            return;
        }
        self.retry_at = None;
        if let Some(old) = self.subscription.take() {
            transport.disconnect(old);
        }
        self.subscribe(transport);
    }

    /// Append one entry, applying FIFO eviction.
    pub fn append_entry(&mut self, entry: LogEntry) {
        self.cleared_marker = None;
        let evicted = self.buffer.push(entry);
        if evicted > 0 {
            tracing::trace!(evicted, "Terminal buffer full; oldest entries evicted");
        }
        self.revision += 1;
        if self.config.auto_scroll {
            self.scroll_requested = true;
        }
    }

    // -------------------------------------------------------------------------
    // Transport and timer input
    // -------------------------------------------------------------------------

    /// Apply one transport event. Events from any subscription other than the
    /// current one are dropped.
    pub fn handle_event<T: StreamTransport>(
        &mut self,
        event: StreamEvent,
        now: Instant,
        transport: &mut T,
    ) {
        if self.subscription != Some(event.subscription) {
            tracing::debug!(
                event_subscription = %event.subscription,
                current = ?self.subscription,
                "Dropping event from stale subscription"
            );
            return;
        }

        match event.kind {
            StreamEventKind::Opened => self.on_opened(),
            StreamEventKind::Message(frame) => self.on_message(&frame),
            StreamEventKind::Error(reason) => self.on_error(&reason, now, transport),
        }
    }

    /// Fire the retry timer if it is due.
    pub fn tick<T: StreamTransport>(&mut self, now: Instant, transport: &mut T) {
        let Some(deadline) = self.retry_at else {
            return;
        };
        if now < deadline {
            return;
        }
        self.retry_at = None;

        if !self.config.visible {
            tracing::debug!("Retry timer fired while hidden; not reconnecting");
            return;
        }

        // The failed handle is discarded, never resumed.
        if let Some(old) = self.subscription.take() {
            transport.disconnect(old);
        }
        tracing::info!("Retrying live log stream");
        self.subscribe(transport);
    }

    fn on_opened(&mut self) {
        if self.state == ConnectionState::Connected {
            return;
        }
        tracing::info!(subscription = ?self.subscription, "Live log stream connected");
        self.set_state(ConnectionState::Connected);
        self.append_entry(LogEntry::now(LogLevel::Success, NOTICE_STARTED));
    }

    fn on_message(&mut self, frame: &str) {
        match payload::decode(frame) {
            Payload::Heartbeat => {}
            Payload::Entry(entry) | Payload::Raw(entry) => self.append_entry(entry),
        }
    }

    fn on_error<T: StreamTransport>(&mut self, reason: &str, now: Instant, transport: &mut T) {
        if self.retry_at.is_some() {
            tracing::debug!(reason, "Stream error while a retry is already pending");
            return;
        }
        if !self.config.visible {
            // Only reachable if a transport reports for a hidden viewer that
            // still holds a handle; nothing to retry for.
            if let Some(old) = self.subscription.take() {
                transport.disconnect(old);
            }
            self.set_state(ConnectionState::Disconnected);
            return;
        }

        tracing::warn!(reason, delay_ms = self.retry_delay.as_millis() as u64, "Live log stream failed");
        self.set_state(ConnectionState::Error);
        self.append_entry(LogEntry::now(
            LogLevel::Warning,
            format!(
                "Log stream disconnected, retrying in {}s...",
                self.retry_delay.as_secs_f32().round() as u64
            ),
        ));
        self.retry_at = Some(now + self.retry_delay);
    }

    fn subscribe<T: StreamTransport>(&mut self, transport: &mut T) {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscription = Some(id);
        self.set_state(ConnectionState::Connecting);
        tracing::debug!(subscription = %id, "Subscribing to live log stream");
        transport.connect(id);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            self.state = state;
            self.revision += 1;
        }
    }

    // -------------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------------

    /// Lines to display, oldest first. After a clear, only the marker.
    pub fn rendered_lines(&self) -> Vec<RenderedLine> {
        if let Some(marker) = &self.cleared_marker {
            return vec![RenderedLine {
                timestamp: "SYSTEM".to_string(),
                level: marker.level,
                text: marker.message.clone(),
                is_marker: true,
            }];
        }
        self.buffer
            .iter()
            .map(|e| RenderedLine {
                timestamp: e.timestamp.clone(),
                level: e.level,
                text: sanitize::display_text(&e.message).into_owned(),
                is_marker: false,
            })
            .collect()
    }

    /// Consume a pending scroll-to-newest request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    /// When the caller should call `tick` next, if a retry is pending.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.retry_at
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn config(&self) -> ViewerConfig {
        self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_at.is_some()
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingTransport {
        connects: Vec<SubscriptionId>,
        disconnects: Vec<SubscriptionId>,
    }

    impl StreamTransport for RecordingTransport {
        fn connect(&mut self, id: SubscriptionId) {
            self.connects.push(id);
        }
        fn disconnect(&mut self, id: SubscriptionId) {
            self.disconnects.push(id);
        }
    }

    const DELAY: Duration = Duration::from_millis(5_000);

    fn viewer(capacity: usize) -> LogStreamViewer {
        LogStreamViewer::new(capacity, DELAY)
    }

    fn ev(id: SubscriptionId, kind: StreamEventKind) -> StreamEvent {
        StreamEvent {
            subscription: id,
            kind,
        }
    }

    fn msg(text: &str) -> StreamEventKind {
        StreamEventKind::Message(format!(
            r#"{{"message":"{text}","level":"info","timestamp":"10:00:00"}}"#
        ))
    }

    fn messages(v: &LogStreamViewer) -> Vec<String> {
        v.buffer().iter().map(|e| e.message.clone()).collect()
    }

    /// Open and drive to Connected; returns the live subscription id.
    fn connected(v: &mut LogStreamViewer, t: &mut RecordingTransport, now: Instant) -> SubscriptionId {
        v.open(t);
        let id = v.subscription().expect("subscribed");
        v.handle_event(ev(id, StreamEventKind::Opened), now, t);
        id
    }

    #[test]
    fn starts_hidden_disconnected_with_ready_notice() {
        let v = viewer(10);
        assert_eq!(v.state(), ConnectionState::Disconnected);
        assert_eq!(v.config(), ViewerConfig::default());
        assert_eq!(messages(&v), vec![NOTICE_READY]);
    }

    #[test]
    fn open_subscribes_once_and_is_idempotent() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        v.open(&mut t);
        v.open(&mut t);
        assert!(v.config().visible);
        assert_eq!(v.state(), ConnectionState::Connecting);
        assert_eq!(t.connects.len(), 1);
    }

    #[test]
    fn opened_event_connects_and_appends_success_notice() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let now = Instant::now();
        connected(&mut v, &mut t, now);
        assert_eq!(v.state(), ConnectionState::Connected);
        let last = v.buffer().iter().last().expect("entry");
        assert_eq!(last.level, LogLevel::Success);
        assert_eq!(last.message, NOTICE_STARTED);
    }

    #[test]
    fn messages_are_appended_in_delivery_order() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let now = Instant::now();
        let id = connected(&mut v, &mut t, now);
        for m in ["one", "two", "three"] {
            v.handle_event(ev(id, msg(m)), now, &mut t);
        }
        let tail: Vec<_> = messages(&v).into_iter().rev().take(3).rev().collect();
        assert_eq!(tail, vec!["one", "two", "three"]);
    }

    #[test]
    fn heartbeat_never_buffered_nor_rendered() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let now = Instant::now();
        let id = connected(&mut v, &mut t, now);
        let len = v.buffer().len();
        let rev = v.revision();
        v.handle_event(ev(id, msg("heartbeat")), now, &mut t);
        v.handle_event(
            ev(
                id,
                StreamEventKind::Message(
                    r#"{"message":"heartbeat","level":null,"timestamp":1700000000}"#.into(),
                ),
            ),
            now,
            &mut t,
        );
        assert_eq!(v.buffer().len(), len);
        assert_eq!(v.revision(), rev);
    }

    #[test]
    fn malformed_payload_yields_exactly_one_raw_info_entry() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let now = Instant::now();
        let id = connected(&mut v, &mut t, now);
        let len = v.buffer().len();
        v.handle_event(ev(id, StreamEventKind::Message("<<garbage>>".into())), now, &mut t);
        assert_eq!(v.buffer().len(), len + 1);
        let last = v.buffer().iter().last().expect("entry");
        assert_eq!(last.message, "<<garbage>>");
        assert_eq!(last.level, LogLevel::Info);
    }

    #[test]
    fn stale_handle_message_after_close_is_ignored() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let now = Instant::now();
        let stale = connected(&mut v, &mut t, now);
        v.close(&mut t);
        assert_eq!(t.disconnects, vec![stale]);
        assert_eq!(v.state(), ConnectionState::Disconnected);

        let snapshot = messages(&v);
        let rev = v.revision();
        v.handle_event(ev(stale, msg("in flight")), now, &mut t);
        v.handle_event(ev(stale, StreamEventKind::Opened), now, &mut t);
        v.handle_event(ev(stale, StreamEventKind::Error("late".into())), now, &mut t);
        assert_eq!(messages(&v), snapshot);
        assert_eq!(v.revision(), rev);
        assert_eq!(v.state(), ConnectionState::Disconnected);
        assert!(!v.retry_pending());
    }

    #[test]
    fn stale_handle_after_reopen_is_ignored() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let now = Instant::now();
        let old = connected(&mut v, &mut t, now);
        v.close(&mut t);
        let new = connected(&mut v, &mut t, now);
        assert_ne!(old, new);
        let len = v.buffer().len();
        v.handle_event(ev(old, msg("ghost")), now, &mut t);
        assert_eq!(v.buffer().len(), len);
        v.handle_event(ev(new, msg("live")), now, &mut t);
        assert_eq!(v.buffer().len(), len + 1);
    }

    #[test]
    fn error_while_visible_schedules_exactly_one_retry() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let t0 = Instant::now();
        let id = connected(&mut v, &mut t, t0);

        v.handle_event(ev(id, StreamEventKind::Error("reset".into())), t0, &mut t);
        assert_eq!(v.state(), ConnectionState::Error);
        assert_eq!(v.next_wakeup(), Some(t0 + DELAY));
        let last = v.buffer().iter().last().expect("entry");
        assert_eq!(last.level, LogLevel::Warning);

        // A duplicate error does not create a second timer or notice.
        let len = v.buffer().len();
        v.handle_event(ev(id, StreamEventKind::Error("again".into())), t0 + DELAY / 2, &mut t);
        assert_eq!(v.next_wakeup(), Some(t0 + DELAY));
        assert_eq!(v.buffer().len(), len);

        // Not yet due.
        v.tick(t0 + DELAY - Duration::from_millis(1), &mut t);
        assert_eq!(t.connects.len(), 1);

        v.tick(t0 + DELAY, &mut t);
        assert_eq!(t.connects.len(), 2);
        assert_eq!(t.disconnects, vec![id]);
        assert_eq!(v.state(), ConnectionState::Connecting);
        assert!(!v.retry_pending());
        assert_ne!(v.subscription(), Some(id));

        // Further ticks do nothing.
        v.tick(t0 + DELAY * 3, &mut t);
        assert_eq!(t.connects.len(), 2);
    }

    #[test]
    fn error_while_connecting_also_retries() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let t0 = Instant::now();
        v.open(&mut t);
        let id = v.subscription().expect("subscribed");
        v.handle_event(ev(id, StreamEventKind::Error("refused".into())), t0, &mut t);
        assert_eq!(v.state(), ConnectionState::Error);
        assert!(v.retry_pending());
    }

    #[test]
    fn close_before_retry_fires_prevents_reconnection() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let t0 = Instant::now();
        let id = connected(&mut v, &mut t, t0);
        v.handle_event(ev(id, StreamEventKind::Error("reset".into())), t0, &mut t);
        v.close(&mut t);
        assert!(!v.retry_pending());
        v.tick(t0 + DELAY * 2, &mut t);
        assert_eq!(t.connects.len(), 1);
        assert_eq!(v.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn open_during_backoff_does_not_duplicate_timer_or_connect() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let t0 = Instant::now();
        let id = connected(&mut v, &mut t, t0);
        v.handle_event(ev(id, StreamEventKind::Error("reset".into())), t0, &mut t);
        v.open(&mut t);
        assert_eq!(t.connects.len(), 1);
        assert_eq!(v.next_wakeup(), Some(t0 + DELAY));
    }

    #[test]
    fn reconnect_supersedes_pending_retry() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let t0 = Instant::now();
        let id = connected(&mut v, &mut t, t0);
        v.handle_event(ev(id, StreamEventKind::Error("reset".into())), t0, &mut t);
        v.reconnect(&mut t);
        assert!(!v.retry_pending());
        assert_eq!(t.connects.len(), 2);
        assert_eq!(v.state(), ConnectionState::Connecting);
        v.tick(t0 + DELAY, &mut t);
        assert_eq!(t.connects.len(), 2);
    }

    #[test]
    fn reconnect_is_ignored_when_hidden() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        v.reconnect(&mut t);
        assert!(t.connects.is_empty());
        assert_eq!(v.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn toggle_opens_then_closes() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        v.toggle(&mut t);
        assert!(v.config().visible);
        v.minimize();
        v.toggle(&mut t);
        assert!(!v.config().visible);
        assert!(!v.config().minimized);
        assert_eq!(t.connects.len(), 1);
        assert_eq!(t.disconnects.len(), 1);
    }

    #[test]
    fn minimize_does_not_touch_subscription() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        v.open(&mut t);
        let sub = v.subscription();
        v.minimize();
        assert!(v.config().minimized);
        assert_eq!(v.subscription(), sub);
        v.minimize();
        assert!(!v.config().minimized);
    }

    #[test]
    fn capacity_three_scenario_through_viewer() {
        let mut v = viewer(3);
        for m in ["A", "B", "C", "D"] {
            v.append_entry(LogEntry::new("t", LogLevel::Info, m));
        }
        assert_eq!(messages(&v), vec!["B", "C", "D"]);
    }

    #[test]
    fn auto_scroll_off_suppresses_scroll_requests() {
        let mut v = viewer(10);
        v.take_scroll_request();
        assert!(v.config().auto_scroll);
        v.toggle_auto_scroll();
        assert!(!v.config().auto_scroll);
        v.append_entry(LogEntry::new("t", LogLevel::Info, "quiet"));
        assert!(!v.take_scroll_request());
    }

    #[test]
    fn auto_scroll_on_requests_immediate_scroll() {
        let mut v = viewer(10);
        v.toggle_auto_scroll();
        v.take_scroll_request();
        v.toggle_auto_scroll();
        assert!(v.take_scroll_request());
        assert!(!v.take_scroll_request());
        v.append_entry(LogEntry::new("t", LogLevel::Info, "loud"));
        assert!(v.take_scroll_request());
    }

    #[test]
    fn clear_on_fifty_entries_shows_only_marker() {
        let mut v = viewer(100);
        for n in 0..50 {
            v.append_entry(LogEntry::new("t", LogLevel::Info, n.to_string()));
        }
        v.clear();
        assert_eq!(v.buffer().len(), 0);
        let lines = v.rendered_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_marker);
        assert_eq!(lines[0].text, NOTICE_CLEARED);

        v.append_entry(LogEntry::new("t", LogLevel::Info, "after"));
        let lines = v.rendered_lines();
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].is_marker);
        assert_eq!(lines[0].text, "after");
    }

    #[test]
    fn clear_keeps_subscription() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let id = connected(&mut v, &mut t, Instant::now());
        v.clear();
        assert_eq!(v.subscription(), Some(id));
        assert_eq!(v.state(), ConnectionState::Connected);
    }

    #[test]
    fn rendered_text_is_sanitised_not_interpreted() {
        let mut v = viewer(10);
        v.append_entry(LogEntry::new("t", LogLevel::Error, "<img src=x onerror=alert(1)>\x1b[2J"));
        let last = v.rendered_lines().pop().expect("line");
        assert_eq!(last.text, "<img src=x onerror=alert(1)>");
        assert_eq!(last.level, LogLevel::Error);
    }

    #[test]
    fn close_without_subscription_adds_no_notice() {
        let mut v = viewer(10);
        let mut t = RecordingTransport::default();
        let len = v.buffer().len();
        v.close(&mut t);
        assert_eq!(v.buffer().len(), len);
        assert!(t.disconnects.is_empty());
    }
}
