// BotConsole - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and config.toml
// loading with startup validation (DevWorkflow Part A Rule 13).
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for BotConsole configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/botconsole/ or %APPDATA%\BotConsole\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation (Rule 13)
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[server]` section.
    pub server: ServerSection,
    /// `[stream]` section.
    pub stream: StreamSection,
    /// `[rate_limit]` section.
    pub rate_limit: RateLimitSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[server]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Backend base URL, e.g. "http://127.0.0.1:5000".
    pub base_url: Option<String>,
}

/// `[stream]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StreamSection {
    /// Terminal buffer capacity (lines).
    pub buffer_lines: Option<usize>,
    /// Delay before re-subscribing after a stream error (ms).
    pub retry_delay_ms: Option<u64>,
}

/// `[rate_limit]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Status refresh interval (s).
    pub poll_interval_secs: Option<u64>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Body font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time (Rule 13).
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Server --
    /// Backend base URL without trailing slash.
    pub server_url: String,

    // -- Stream --
    /// Terminal buffer capacity.
    pub buffer_capacity: usize,
    /// Fixed reconnect delay.
    pub retry_delay: Duration,

    // -- Rate limit --
    /// Status refresh interval.
    pub rate_limit_poll: Duration,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    /// Body font size in points.
    pub font_size: f32,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: constants::DEFAULT_SERVER_URL.to_string(),
            buffer_capacity: constants::DEFAULT_BUFFER_CAPACITY,
            retry_delay: Duration::from_millis(constants::DEFAULT_RETRY_DELAY_MS),
            rate_limit_poll: Duration::from_secs(constants::DEFAULT_RATE_LIMIT_POLL_SECS),
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
            log_file: None,
        }
    }
}

/// Check a user-supplied backend URL. Returns the normalised URL (no
/// trailing slash) or a warning message.
pub fn validate_server_url(url: &str) -> Result<String, String> {
    let trimmed = url.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty())
        .unwrap_or(false);
    if has_scheme && has_host {
        Ok(trimmed.to_string())
    } else {
        Err(format!(
            "server URL \"{url}\" must start with http:// or https:// and name a host"
        ))
    }
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with an error warning
/// (fail-fast on misconfiguration per Rule 13 -- the application still starts
/// but the user is informed).
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    match read_raw_config(config_path) {
        Ok(raw) => {
            tracing::info!(path = %config_path.display(), "Loaded config.toml");
            validate(raw)
        }
        Err(e) => {
            let msg = format!(
                "{e}. Using defaults. See config.example.toml for the expected format."
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            (AppConfig::default(), warnings)
        }
    }
}

/// Read and deserialise config.toml without validating values.
pub fn read_raw_config(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Parse and validate config.toml content.
pub fn parse_config(content: &str) -> (AppConfig, Vec<String>) {
    match toml::from_str::<RawConfig>(content) {
        Ok(raw) => validate(raw),
        Err(e) => (
            AppConfig::default(),
            vec![format!("Failed to parse config: {e}. Using defaults.")],
        ),
    }
}

/// Warning text for a numeric value outside its allowed range.
fn out_of_range(
    field: &str,
    value: impl Display,
    min: impl Display,
    max: impl Display,
    default: impl Display,
) -> String {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}"),
    };
    format!("{err}. Using default ({default}).")
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Server: base_url --
    if let Some(ref url) = raw.server.base_url {
        match validate_server_url(url) {
            Ok(u) => config.server_url = u,
            Err(reason) => warnings.push(format!(
                "[server] base_url: {reason}. Using default ({}).",
                constants::DEFAULT_SERVER_URL
            )),
        }
    }

    // -- Stream: buffer_lines --
    if let Some(lines) = raw.stream.buffer_lines {
        if (constants::MIN_BUFFER_CAPACITY..=constants::ABSOLUTE_MAX_BUFFER_CAPACITY)
            .contains(&lines)
        {
            config.buffer_capacity = lines;
        } else {
            warnings.push(out_of_range(
                "stream.buffer_lines",
                lines,
                constants::MIN_BUFFER_CAPACITY,
                constants::ABSOLUTE_MAX_BUFFER_CAPACITY,
                constants::DEFAULT_BUFFER_CAPACITY,
            ));
        }
    }

    // -- Stream: retry_delay_ms --
    if let Some(ms) = raw.stream.retry_delay_ms {
        if (constants::MIN_RETRY_DELAY_MS..=constants::MAX_RETRY_DELAY_MS).contains(&ms) {
            config.retry_delay = Duration::from_millis(ms);
        } else {
            warnings.push(out_of_range(
                "stream.retry_delay_ms",
                ms,
                constants::MIN_RETRY_DELAY_MS,
                constants::MAX_RETRY_DELAY_MS,
                constants::DEFAULT_RETRY_DELAY_MS,
            ));
        }
    }

    // -- Rate limit: poll_interval_secs --
    if let Some(secs) = raw.rate_limit.poll_interval_secs {
        if (constants::MIN_RATE_LIMIT_POLL_SECS..=constants::MAX_RATE_LIMIT_POLL_SECS)
            .contains(&secs)
        {
            config.rate_limit_poll = Duration::from_secs(secs);
        } else {
            warnings.push(out_of_range(
                "rate_limit.poll_interval_secs",
                secs,
                constants::MIN_RATE_LIMIT_POLL_SECS,
                constants::MAX_RATE_LIMIT_POLL_SECS,
                constants::DEFAULT_RATE_LIMIT_POLL_SECS,
            ));
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => {
                warnings.push(format!(
                    "[ui] theme = \"{other}\" is not recognised. Expected \"dark\" or \"light\". Using default (dark).",
                ));
            }
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            warnings.push(out_of_range(
                "ui.font_size",
                size,
                constants::MIN_FONT_SIZE,
                constants::MAX_FONT_SIZE,
                constants::DEFAULT_FONT_SIZE,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gives_defaults() {
        let (config, warnings) = parse_config("");
        assert!(warnings.is_empty());
        assert_eq!(config.buffer_capacity, constants::DEFAULT_BUFFER_CAPACITY);
        assert_eq!(config.retry_delay, Duration::from_millis(5_000));
        assert_eq!(config.server_url, constants::DEFAULT_SERVER_URL);
    }

    #[test]
    fn valid_values_are_applied() {
        let (config, warnings) = parse_config(
            r#"
            [server]
            base_url = "https://bot.example.com/"

            [stream]
            buffer_lines = 250
            retry_delay_ms = 2000

            [rate_limit]
            poll_interval_secs = 60

            [ui]
            theme = "light"

            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.server_url, "https://bot.example.com");
        assert_eq!(config.buffer_capacity, 250);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.rate_limit_poll, Duration::from_secs(60));
        assert!(!config.dark_mode);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = parse_config(
            r#"
            [server]
            base_url = "ftp://nope"

            [stream]
            buffer_lines = 0
            retry_delay_ms = 1
            "#,
        );
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(config.buffer_capacity, constants::DEFAULT_BUFFER_CAPACITY);
        assert_eq!(config.server_url, constants::DEFAULT_SERVER_URL);
    }

    #[test]
    fn unparseable_toml_warns() {
        let (_, warnings) = parse_config("[stream\nbuffer_lines = ");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn missing_file_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.buffer_capacity, constants::DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn file_on_disk_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stream]\nbuffer_lines = 42\n").unwrap();
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty());
        assert_eq!(config.buffer_capacity, 42);
    }

    #[test]
    fn broken_file_on_disk_warns_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stream\n").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config parse error"), "{warnings:?}");
        assert_eq!(config.buffer_capacity, constants::DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn range_warning_names_field_and_bounds() {
        let (_, warnings) = parse_config("[rate_limit]\npoll_interval_secs = 1\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("rate_limit.poll_interval_secs"));
        assert!(warnings[0].contains("10-3600"));
    }

    #[test]
    fn server_url_validation() {
        assert_eq!(
            validate_server_url("http://localhost:5000/").unwrap(),
            "http://localhost:5000"
        );
        assert!(validate_server_url("localhost:5000").is_err());
        assert!(validate_server_url("http://").is_err());
    }
}
