// BotConsole - core/export.rs
//
// CSV and JSON export of the terminal buffer.
// Core layer: writes to any Write trait object.

use crate::core::model::LogEntry;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export entries to CSV format.
///
/// Writes: timestamp, level, message
pub fn export_csv<W: Write>(
    entries: &[LogEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["timestamp", "level", "message"])
        .map_err(csv_err)?;

    let mut count = 0;
    for entry in entries {
        csv_writer
            .write_record([entry.timestamp.as_str(), entry.level.label(), entry.message.as_str()])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), count, "Exported terminal to CSV");
    Ok(count)
}

/// Export entries to JSON format (array of objects).
pub fn export_json<W: Write>(
    entries: &[LogEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, entries).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %export_path.display(), count = entries.len(), "Exported terminal to JSON");
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogLevel;

    fn make_entry(message: &str) -> LogEntry {
        LogEntry::new("12:00:00", LogLevel::Warning, message)
    }

    #[test]
    fn test_csv_export() {
        let entries = vec![make_entry("Rate limit hit"), make_entry("Retrying, later")];
        let mut buf = Vec::new();
        let count = export_csv(&entries, &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("timestamp,level,message"));
        assert!(output.contains("12:00:00,warning,Rate limit hit"));
        assert!(output.contains("\"Retrying, later\""));
    }

    #[test]
    fn test_json_export() {
        let entries = vec![make_entry("Test message")];
        let mut buf = Vec::new();
        let count = export_json(&entries, &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 1);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["message"], "Test message");
        assert_eq!(value[0]["level"], "warning");
    }
}
