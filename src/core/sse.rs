// BotConsole - core/sse.rs
//
// Incremental decoder for the `text/event-stream` wire format.
//
// Fed one line at a time (without the trailing newline). Only events of the
// default type ("message") are surfaced, which is what the log stream sends.
// `id` and `retry` fields are accepted and ignored: the viewer owns the
// reconnect policy and always waits a fixed delay.
//
// Bounds (Rule 11): each line is truncated to MAX_SSE_LINE_BYTES and the
// accumulated data of a single event to MAX_SSE_EVENT_BYTES.

use crate::util::constants::{MAX_SSE_EVENT_BYTES, MAX_SSE_LINE_BYTES};

/// Accumulates field lines until a blank line dispatches the event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    data: String,
    has_data: bool,
    event_type: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns the event data when the line completes a
    /// default-type event.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let line = truncate_to_boundary(line, MAX_SSE_LINE_BYTES);

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                if self.has_data {
                    self.data.push('\n');
                }
                let room = MAX_SSE_EVENT_BYTES.saturating_sub(self.data.len());
                self.data.push_str(truncate_to_boundary(value, room));
                self.has_data = true;
            }
            "event" => self.event_type = Some(value.to_string()),
            "id" | "retry" => {}
            other => tracing::trace!(field = other, "Ignoring unknown SSE field"),
        }
        None
    }

    /// Flush a pending event at end of stream. Per the wire format an
    /// unterminated event is discarded, so this only resets state.
    pub fn finish(&mut self) {
        self.reset();
    }

    fn dispatch(&mut self) -> Option<String> {
        if !self.has_data {
            self.event_type = None;
            return None;
        }
        let is_message = matches!(self.event_type.as_deref(), None | Some("") | Some("message"));
        let data = std::mem::take(&mut self.data);
        self.reset();
        if is_message {
            Some(data)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.data.clear();
        self.has_data = false;
        self.event_type = None;
    }
}

fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
