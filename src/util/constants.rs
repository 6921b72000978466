// BotConsole - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Referenced by DevWorkflow Part A Rule 11 (explicit named-constant limits).

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "BotConsole";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "BotConsole";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Backend endpoints
// =============================================================================

/// Default backend base URL (the automation dashboard's development server).
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Server-push log stream endpoint.
pub const LOG_STREAM_PATH: &str = "/api/logs/stream";

/// Rate-limit status endpoint.
pub const RATE_LIMIT_STATUS_PATH: &str = "/api/rate_limit_status";

/// Retry all rate-limited tweets.
pub const RETRY_RATE_LIMITED_PATH: &str = "/retry_rate_limited_tweets";

/// Post a pending tweet through the API.
pub const POST_TWEET_PATH: &str = "/post_tweet";

/// Delete a pending tweet.
pub const DELETE_TWEET_PATH: &str = "/delete_tweet";

/// Request a manual share URL for a pending tweet.
pub const MANUAL_POST_PATH: &str = "/manual_post_tweet";

/// Record a manual share as posted.
pub const CONFIRM_MANUAL_POST_PATH: &str = "/confirm_manual_post";

// =============================================================================
// Live log stream
// =============================================================================

/// Default maximum number of entries held by the terminal buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1_000;

/// Minimum user-configurable buffer capacity.
pub const MIN_BUFFER_CAPACITY: usize = 1;

/// Hard upper bound on buffer capacity (prevents configuration mistakes).
pub const ABSOLUTE_MAX_BUFFER_CAPACITY: usize = 100_000;

/// Fixed delay before a failed stream is re-subscribed (ms).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

/// Minimum user-configurable retry delay (ms).
pub const MIN_RETRY_DELAY_MS: u64 = 500;

/// Maximum user-configurable retry delay (ms).
pub const MAX_RETRY_DELAY_MS: u64 = 300_000; // 5 min

/// TCP connect timeout for the stream and action requests (s).
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Overall timeout for a single action request (s). The log stream has no
/// read timeout: it is expected to stay open indefinitely.
pub const ACTION_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Message payload the server sends purely to keep the stream alive.
pub const HEARTBEAT_MESSAGE: &str = "heartbeat";

/// Maximum bytes kept from a single SSE line. Longer lines are truncated so a
/// misbehaving server cannot grow the decoder without bound.
pub const MAX_SSE_LINE_BYTES: usize = 64 * 1_024;

/// Maximum accumulated `data:` payload for a single SSE event.
pub const MAX_SSE_EVENT_BYTES: usize = 256 * 1_024;

/// Maximum number of stream events applied to the viewer per UI frame.
/// Remaining events stay queued for the next frame.
pub const MAX_STREAM_EVENTS_PER_FRAME: usize = 500;

/// Repaint cadence while the terminal is open (ms), so queued stream events
/// and the retry timer are serviced without user input.
pub const STREAM_REPAINT_INTERVAL_MS: u64 = 200;

// =============================================================================
// Rate-limit panel
// =============================================================================

/// How often the rate-limit status is refreshed (s).
pub const DEFAULT_RATE_LIMIT_POLL_SECS: u64 = 120;

/// Minimum user-configurable rate-limit poll interval (s).
pub const MIN_RATE_LIMIT_POLL_SECS: u64 = 10;

/// Maximum user-configurable rate-limit poll interval (s).
pub const MAX_RATE_LIMIT_POLL_SECS: u64 = 3_600;

// =============================================================================
// UI defaults
// =============================================================================

/// Default UI body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.5;

/// Minimum user-configurable UI font size (points).
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable UI font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

/// Timestamp format for locally synthesised terminal notices.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a payload included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
