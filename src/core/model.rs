// BotConsole - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};

// =============================================================================
// Log Entry
// =============================================================================

/// A single line shown in the live terminal.
///
/// Created either from a stream payload or from a locally synthesised system
/// notice. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Timestamp text as supplied by the server, or local `HH:MM:SS` for
    /// system notices and payloads without one.
    pub timestamp: String,

    /// Display level.
    pub level: LogLevel,

    /// Raw message text. Sanitised only at render time.
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            level,
            message: message.into(),
        }
    }

    /// Build an entry stamped with the current local wall-clock time.
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self::new(local_timestamp(), level, message)
    }
}

/// Current local time formatted for terminal lines.
pub fn local_timestamp() -> String {
    chrono::Local::now()
        .format(crate::util::constants::LOCAL_TIMESTAMP_FORMAT)
        .to_string()
}

// =============================================================================
// Log level
// =============================================================================

/// Levels understood by the terminal. Anything else on the wire maps to
/// `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
    Debug,
    Success,
}

impl LogLevel {
    /// Parse a wire level string (case-insensitive). Unknown values are `None`.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "debug" => Some(Self::Debug),
            "success" => Some(Self::Success),
            _ => None,
        }
    }

    /// Lowercase label, matching the wire format.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Debug => "debug",
            Self::Success => "success",
        }
    }

    /// Short label for compact display.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERR",
            Self::Debug => "DBG",
            Self::Success => "OK",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Connection state
// =============================================================================

/// State of the live log subscription, shown as the terminal's status
/// indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    /// Human-readable label for the status indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Error => "Connection error",
        }
    }
}

// =============================================================================
// Viewer flags
// =============================================================================

/// UI-only flags of the terminal panel. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerConfig {
    pub auto_scroll: bool,
    pub minimized: bool,
    pub visible: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            minimized: false,
            visible: false,
        }
    }
}

// =============================================================================
// Stream events (transport -> viewer)
// =============================================================================

/// Handle identifying one subscription attempt. A fresh id is issued for every
/// attempt; events tagged with any other id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An event delivered by the stream transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub subscription: SubscriptionId,
    pub kind: StreamEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEventKind {
    /// The channel is open and events may follow.
    Opened,
    /// One text frame (the SSE `data` of a default-type event).
    Message(String),
    /// The transport failed. No further events follow for this subscription.
    Error(String),
}

// =============================================================================
// Rendering
// =============================================================================

/// One line as it should be displayed. `text` is already sanitised and must
/// be rendered as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub timestamp: String,
    pub level: LogLevel,
    pub text: String,
    /// True for the synthetic marker shown after a clear.
    pub is_marker: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_levels_parse_case_insensitively() {
        assert_eq!(LogLevel::from_wire("SUCCESS"), Some(LogLevel::Success));
        assert_eq!(LogLevel::from_wire(" warning "), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_wire("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_wire("critical"), None);
    }

    #[test]
    fn viewer_config_defaults() {
        let c = ViewerConfig::default();
        assert!(c.auto_scroll);
        assert!(!c.minimized);
        assert!(!c.visible);
    }

    #[test]
    fn local_timestamp_is_clock_time() {
        let ts = local_timestamp();
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.matches(':').count(), 2);
    }
}
