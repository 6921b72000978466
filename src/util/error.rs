// BotConsole - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation (DevWorkflow Part A Rule 2).
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all BotConsole operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum BotConsoleError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Live log stream transport failed.
    Stream(StreamError),

    /// An action or status request failed.
    Action(ActionError),

    /// Export operation failed.
    Export(ExportError),
}

impl fmt::Display for BotConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Stream(e) => write!(f, "Stream error: {e}"),
            Self::Action(e) => write!(f, "Action error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl std::error::Error for BotConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Stream(e) => Some(e),
            Self::Action(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Stream errors
// ---------------------------------------------------------------------------

/// Errors raised by the server-push log stream transport.
///
/// None of these are fatal to the application: the viewer turns each one into
/// a warning line plus a single scheduled retry.
#[derive(Debug)]
pub enum StreamError {
    /// The HTTP client could not be built.
    Client { source: reqwest::Error },

    /// The subscription's async runtime could not be started.
    Runtime { source: io::Error },

    /// The request could not be sent (DNS, refused connection, TLS, ...).
    Connect { url: String, source: reqwest::Error },

    /// The server answered with a non-success status.
    Status { url: String, status: u16 },

    /// Reading the event stream body failed.
    Read { url: String, source: reqwest::Error },

    /// The server closed the event stream.
    Closed { url: String },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { source } => write!(f, "cannot build HTTP client: {source}"),
            Self::Connect { url, source } => write!(f, "cannot connect to '{url}': {source}"),
            Self::Status { url, status } => {
                write!(f, "'{url}' answered with HTTP status {status}")
            }
            Self::Runtime { source } => write!(f, "cannot start stream runtime: {source}"),
            Self::Read { url, source } => write!(f, "read error on '{url}': {source}"),
            Self::Closed { url } => write!(f, "'{url}' closed the stream"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source } => Some(source),
            Self::Connect { source, .. } => Some(source),
            Self::Runtime { source } => Some(source),
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StreamError> for BotConsoleError {
    fn from(e: StreamError) -> Self {
        Self::Stream(e)
    }
}

// ---------------------------------------------------------------------------
// Action errors
// ---------------------------------------------------------------------------

/// Errors raised by action and status requests.
#[derive(Debug)]
pub enum ActionError {
    /// The HTTP client could not be built.
    Client { source: reqwest::Error },

    /// The request could not be sent or its body could not be read.
    Request {
        endpoint: &'static str,
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    Status { endpoint: &'static str, status: u16 },

    /// The response body was not the expected JSON shape.
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },

    /// The server processed the request but reported `success: false`.
    Rejected {
        endpoint: &'static str,
        message: String,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { source } => write!(f, "cannot build HTTP client: {source}"),
            Self::Request { endpoint, source } => {
                write!(f, "request to '{endpoint}' failed: {source}")
            }
            Self::Status { endpoint, status } => {
                write!(f, "'{endpoint}' answered with HTTP status {status}")
            }
            Self::Decode { endpoint, source } => {
                write!(f, "unexpected response from '{endpoint}': {source}")
            }
            Self::Rejected { message, .. } => f.write_str(message),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source } => Some(source),
            Self::Request { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ActionError> for BotConsoleError {
    fn from(e: ActionError) -> Self {
        Self::Action(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for BotConsoleError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for BotConsoleError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for BotConsole results.
pub type Result<T> = std::result::Result<T, BotConsoleError>;
