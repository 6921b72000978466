// BotConsole - core/payload.rs
//
// Decoding of live log stream frames into terminal entries.
//
// Frame shape: {"message": "...", "level": "info", "timestamp": "..."}
//   - message == "heartbeat"         -> discarded (keep-alive only)
//   - not an object with a string
//     `message` field                -> one raw `info` entry, verbatim text
//   - otherwise                      -> entry; unknown/missing/non-string
//                                       level is info, missing/empty/non-string
//                                       timestamp is local time

use crate::core::model::{local_timestamp, LogEntry, LogLevel};
use crate::util::constants::HEARTBEAT_MESSAGE;
use serde_json::Value;

/// Result of decoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Keep-alive ping: never rendered, never buffered.
    Heartbeat,
    /// A well-formed log line.
    Entry(LogEntry),
    /// The frame was not valid JSON of the expected shape; shown verbatim.
    Raw(LogEntry),
}

impl Payload {
    /// The entry to append, if any.
    pub fn into_entry(self) -> Option<LogEntry> {
        match self {
            Payload::Heartbeat => None,
            Payload::Entry(e) | Payload::Raw(e) => Some(e),
        }
    }
}

/// Decode one text frame.
///
/// Only `message` decides the shape; `level` and `timestamp` are read
/// leniently, so a heartbeat is recognised whatever the other fields hold.
pub fn decode(frame: &str) -> Payload {
    let value = match serde_json::from_str::<Value>(frame) {
        Ok(v) => v,
        Err(e) => return raw(frame, &e.to_string()),
    };
    let Some(message) = value.get("message").and_then(Value::as_str) else {
        return raw(frame, "no string `message` field");
    };
    if message == HEARTBEAT_MESSAGE {
        return Payload::Heartbeat;
    }

    let level = value
        .get("level")
        .and_then(Value::as_str)
        .and_then(LogLevel::from_wire)
        .unwrap_or_default();
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(local_timestamp);
    Payload::Entry(LogEntry::new(timestamp, level, message))
}

fn raw(frame: &str, reason: &str) -> Payload {
    tracing::debug!(
        reason,
        frame = crate::util::logging::preview(frame),
        "Stream frame is not a JSON log payload; showing raw text"
    );
    Payload::Raw(LogEntry::new(local_timestamp(), LogLevel::Info, frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_is_discarded() {
        let p = decode(r#"{"message":"heartbeat","level":"info","timestamp":"12:00:00"}"#);
        assert_eq!(p, Payload::Heartbeat);
        assert!(p.into_entry().is_none());
    }

    #[test]
    fn well_formed_frame_becomes_entry() {
        let p = decode(r#"{"message":"Posted tweet 42","level":"success","timestamp":"12:01:02"}"#);
        assert_eq!(
            p,
            Payload::Entry(LogEntry::new("12:01:02", LogLevel::Success, "Posted tweet 42"))
        );
    }

    #[test]
    fn malformed_frame_is_raw_info_verbatim() {
        let p = decode("not json {");
        match p {
            Payload::Raw(e) => {
                assert_eq!(e.message, "not json {");
                assert_eq!(e.level, LogLevel::Info);
            }
            other => panic!("expected raw entry, got {other:?}"),
        }
    }

    #[test]
    fn json_without_string_message_is_raw() {
        assert!(matches!(decode(r#"{"level":"info"}"#), Payload::Raw(_)));
        assert!(matches!(decode(r#"{"message":5}"#), Payload::Raw(_)));
        assert!(matches!(decode("[1,2,3]"), Payload::Raw(_)));
    }

    #[test]
    fn unknown_level_and_missing_timestamp_fall_back() {
        match decode(r#"{"message":"x","level":"verbose"}"#) {
            Payload::Entry(e) => {
                assert_eq!(e.level, LogLevel::Info);
                assert_eq!(e.timestamp.len(), 8);
            }
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn heartbeat_with_odd_field_types_is_discarded() {
        for frame in [
            r#"{"message":"heartbeat","level":null,"timestamp":1700000000}"#,
            r#"{"message":"heartbeat","timestamp":1700000000}"#,
            r#"{"message":"heartbeat","level":3}"#,
        ] {
            assert_eq!(decode(frame), Payload::Heartbeat, "{frame}");
        }
    }

    #[test]
    fn non_string_level_and_timestamp_fall_back() {
        match decode(r#"{"message":"tick","level":7,"timestamp":1700000000}"#) {
            Payload::Entry(e) => {
                assert_eq!(e.message, "tick");
                assert_eq!(e.level, LogLevel::Info);
                assert_eq!(e.timestamp.len(), 8);
            }
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn heartbeat_match_is_exact() {
        assert!(matches!(
            decode(r#"{"message":"heartbeat received from worker"}"#),
            Payload::Entry(_)
        ));
    }
}
