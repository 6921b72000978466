// BotConsole - app/state.rs
//
// Application state management. Holds the live log viewer, rate-limit
// status, the pending notice/confirmation dialogs and the action form.
// Owned by the eframe::App implementation.

use crate::app::actions::{ActionOutcome, ActionRequest, ActionSuccess};
use crate::core::model::{LogEntry, LogLevel, RenderedLine};
use crate::core::rate_limit::RateLimitView;
use crate::core::viewer::LogStreamViewer;
use crate::platform::config::AppConfig;
use crate::util::error::ActionError;
use std::time::{Duration, Instant};

/// Severity of a blocking notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A modal message the operator must dismiss.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

/// A question awaiting a yes/no answer before a request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    /// "Post this tweet now?"
    Post { tweet_id: String },
    /// "Delete this tweet?"
    Delete { tweet_id: String },
    /// Share page was opened; "Did you post it?"
    ManualPosted { tweet_id: String },
}

impl PendingConfirm {
    pub fn question(&self) -> String {
        match self {
            Self::Post { tweet_id } => format!("Post tweet {tweet_id} now?"),
            Self::Delete { tweet_id } => format!("Delete tweet {tweet_id}? This cannot be undone."),
            Self::ManualPosted { tweet_id } => format!(
                "The share page for tweet {tweet_id} was opened in your browser.\n\
                 Did you post it?"
            ),
        }
    }

    /// Request to send when the operator answers yes.
    pub fn accept(&self) -> ActionRequest {
        match self {
            Self::Post { tweet_id } => ActionRequest::PostTweet {
                tweet_id: tweet_id.clone(),
            },
            Self::Delete { tweet_id } => ActionRequest::DeleteTweet {
                tweet_id: tweet_id.clone(),
            },
            Self::ManualPosted { tweet_id } => ActionRequest::ConfirmManualPost {
                tweet_id: tweet_id.clone(),
            },
        }
    }
}

/// Work the UI shell must do after an outcome is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Re-fetch the rate-limit status.
    RefreshRateLimit,
    /// Open a URL in the system browser.
    OpenUrl(String),
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Live log terminal.
    pub viewer: LogStreamViewer,

    /// Current rate-limit panel content.
    pub rate_limit: RateLimitView,

    /// When the rate-limit status was last requested.
    pub last_rate_limit_request: Option<Instant>,

    /// Interval between rate-limit refreshes.
    pub rate_limit_poll: Duration,

    /// A rate-limit refresh request is outstanding.
    pub rate_limit_in_flight: bool,

    /// The retry-rate-limited request is outstanding; the button is disabled
    /// and relabelled until it completes.
    pub retry_in_flight: bool,

    /// Tweet form requests outstanding; the form is disabled while non-zero.
    pub tweet_actions_in_flight: usize,

    /// Tweet id typed into the action form.
    pub tweet_id_input: String,

    /// Modal notice currently shown.
    pub notice: Option<Notice>,

    /// Confirmation dialog currently shown.
    pub pending_confirm: Option<PendingConfirm>,

    /// Status message for the status bar.
    pub status_message: String,

    /// Non-fatal config warnings from startup.
    pub warnings: Vec<String>,

    /// Backend base URL (for display).
    pub server_url: String,

    /// Whether to show the about dialog.
    pub show_about: bool,

    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,

    /// Sanitised terminal lines, rebuilt when the viewer revision changes.
    rendered: Vec<RenderedLine>,
    rendered_revision: Option<u64>,
}

impl AppState {
    /// Create initial state from the validated configuration.
    pub fn new(config: &AppConfig, debug_mode: bool) -> Self {
        Self {
            viewer: LogStreamViewer::new(config.buffer_capacity, config.retry_delay),
            rate_limit: RateLimitView::Loading,
            last_rate_limit_request: None,
            rate_limit_poll: config.rate_limit_poll,
            rate_limit_in_flight: false,
            retry_in_flight: false,
            tweet_actions_in_flight: 0,
            tweet_id_input: String::new(),
            notice: None,
            pending_confirm: None,
            status_message: format!("Ready. Backend: {}", config.server_url),
            warnings: Vec::new(),
            server_url: config.server_url.clone(),
            show_about: false,
            dark_mode: config.dark_mode,
            debug_mode,
            rendered: Vec::new(),
            rendered_revision: None,
        }
    }

    /// Terminal lines for display. Re-rendered only after the viewer changed.
    pub fn terminal_lines(&mut self) -> &[RenderedLine] {
        let revision = self.viewer.revision();
        if self.rendered_revision != Some(revision) {
            self.rendered = self.viewer.rendered_lines();
            self.rendered_revision = Some(revision);
        }
        &self.rendered
    }

    /// Whether a rate-limit refresh should be issued now.
    pub fn rate_limit_refresh_due(&self, now: Instant) -> bool {
        if self.rate_limit_in_flight {
            return false;
        }
        match self.last_rate_limit_request {
            None => true,
            Some(last) => now.duration_since(last) >= self.rate_limit_poll,
        }
    }

    /// Record that a refresh was sent at `now`.
    pub fn mark_rate_limit_requested(&mut self, now: Instant) {
        self.last_rate_limit_request = Some(now);
        self.rate_limit_in_flight = true;
    }

    /// When the next scheduled refresh is due.
    pub fn next_rate_limit_refresh(&self) -> Option<Instant> {
        self.last_rate_limit_request.map(|t| t + self.rate_limit_poll)
    }

    /// Trimmed tweet id from the form, if any.
    pub fn tweet_id(&self) -> Option<String> {
        let id = self.tweet_id_input.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    /// Show a modal notice. A newer notice replaces an older one.
    pub fn show_notice(&mut self, kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            title: title.into(),
            message: message.into(),
        });
    }

    /// Whether the tweet form should be disabled. Status refreshes do not
    /// count.
    pub fn tweet_action_busy(&self) -> bool {
        self.tweet_actions_in_flight > 0
    }

    /// Mark a request as sent, updating button state.
    pub fn on_request_submitted(&mut self, request: &ActionRequest) {
        if request.is_tweet_action() {
            self.tweet_actions_in_flight += 1;
        }
        match request {
            ActionRequest::RetryRateLimited => self.retry_in_flight = true,
            ActionRequest::RefreshRateLimit => {}
            other => self.status_message = format!("{}...", other.describe()),
        }
    }

    /// Apply a completed request. Returns follow-up work for the UI shell.
    pub fn apply_outcome(&mut self, outcome: ActionOutcome) -> Option<FollowUp> {
        let ActionOutcome { request, result } = outcome;

        if request.is_tweet_action() {
            self.tweet_actions_in_flight = self.tweet_actions_in_flight.saturating_sub(1);
        }
        match &request {
            ActionRequest::RefreshRateLimit => self.rate_limit_in_flight = false,
            ActionRequest::RetryRateLimited => self.retry_in_flight = false,
            _ => {}
        }

        let success = match result {
            Ok(success) => success,
            Err(e) => {
                self.on_failure(&request, &e);
                return None;
            }
        };

        let follow_up = match success {
            ActionSuccess::RateLimit(resp) => {
                self.rate_limit = RateLimitView::from_response(&resp);
                None
            }
            ActionSuccess::ManualShare { x_share_url } => {
                if let ActionRequest::ManualPost { tweet_id } = &request {
                    self.pending_confirm = Some(PendingConfirm::ManualPosted {
                        tweet_id: tweet_id.clone(),
                    });
                }
                self.status_message = "Share page opened in browser".to_string();
                Some(FollowUp::OpenUrl(x_share_url))
            }
            ActionSuccess::Posted { tweet_url } => {
                let message = match tweet_url {
                    Some(url) => format!("Tweet posted successfully.\n{url}"),
                    None => "Tweet posted successfully.".to_string(),
                };
                self.show_notice(NoticeKind::Success, "Posted", message);
                Some(FollowUp::RefreshRateLimit)
            }
            ActionSuccess::Deleted => {
                self.show_notice(NoticeKind::Success, "Deleted", "Tweet deleted.");
                Some(FollowUp::RefreshRateLimit)
            }
            ActionSuccess::ManualConfirmed => {
                self.show_notice(NoticeKind::Success, "Recorded", "Manual post recorded.");
                Some(FollowUp::RefreshRateLimit)
            }
            ActionSuccess::RetryStarted => {
                self.show_notice(
                    NoticeKind::Success,
                    "Retry started",
                    "Rate-limited tweets are being retried.",
                );
                Some(FollowUp::RefreshRateLimit)
            }
        };

        if request.is_mutating() {
            self.status_message = format!("{} succeeded", request.describe());
            self.viewer.append_entry(LogEntry::now(
                LogLevel::Success,
                format!("{} succeeded", request.describe()),
            ));
        }
        follow_up
    }

    fn on_failure(&mut self, request: &ActionRequest, error: &ActionError) {
        if matches!(request, ActionRequest::RefreshRateLimit) {
            // The panel shows the problem; no modal every two minutes.
            self.rate_limit = RateLimitView::Unreachable;
            return;
        }
        self.status_message = format!("{} failed", request.describe());
        self.show_notice(
            NoticeKind::Error,
            format!("{} failed", request.describe()),
            error.to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate_limit::{ApiRateLimit, RateLimitStatusResponse};

    fn state() -> AppState {
        AppState::new(&AppConfig::default(), false)
    }

    fn rejected(message: &str) -> ActionError {
        ActionError::Rejected {
            endpoint: "/post_tweet",
            message: message.to_string(),
        }
    }

    #[test]
    fn viewer_uses_configured_capacity() {
        let config = AppConfig {
            buffer_capacity: 7,
            ..AppConfig::default()
        };
        let s = AppState::new(&config, false);
        assert_eq!(s.viewer.buffer().capacity(), 7);
        assert_eq!(s.viewer.retry_delay(), config.retry_delay);
    }

    #[test]
    fn rate_limit_refresh_schedule() {
        let mut s = state();
        let t0 = Instant::now();
        assert!(s.rate_limit_refresh_due(t0));
        s.mark_rate_limit_requested(t0);
        assert!(!s.rate_limit_refresh_due(t0 + s.rate_limit_poll * 2));

        s.apply_outcome(ActionOutcome {
            request: ActionRequest::RefreshRateLimit,
            result: Ok(ActionSuccess::RateLimit(RateLimitStatusResponse {
                success: true,
                ..Default::default()
            })),
        });
        assert_eq!(s.rate_limit, RateLimitView::Clear);
        assert!(!s.rate_limit_refresh_due(t0 + Duration::from_secs(1)));
        assert!(s.rate_limit_refresh_due(t0 + s.rate_limit_poll));
    }

    #[test]
    fn failed_refresh_is_unreachable_without_modal() {
        let mut s = state();
        s.mark_rate_limit_requested(Instant::now());
        s.apply_outcome(ActionOutcome {
            request: ActionRequest::RefreshRateLimit,
            result: Err(rejected("boom")),
        });
        assert_eq!(s.rate_limit, RateLimitView::Unreachable);
        assert!(s.notice.is_none());
        assert!(!s.rate_limit_in_flight);
    }

    #[test]
    fn failed_retry_restores_button_and_shows_notice() {
        let mut s = state();
        s.on_request_submitted(&ActionRequest::RetryRateLimited);
        assert!(s.retry_in_flight);
        let follow = s.apply_outcome(ActionOutcome {
            request: ActionRequest::RetryRateLimited,
            result: Err(ActionError::Status {
                endpoint: "/retry_rate_limited_tweets",
                status: 500,
            }),
        });
        assert!(follow.is_none());
        assert!(!s.retry_in_flight);
        let notice = s.notice.expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
    }

    #[test]
    fn rejected_post_shows_server_error_text() {
        let mut s = state();
        s.apply_outcome(ActionOutcome {
            request: ActionRequest::PostTweet {
                tweet_id: "42".into(),
            },
            result: Err(rejected("Tweet already posted")),
        });
        assert_eq!(s.notice.expect("notice").message, "Tweet already posted");
    }

    #[test]
    fn mutating_success_refreshes_rate_limit() {
        let mut s = state();
        let follow = s.apply_outcome(ActionOutcome {
            request: ActionRequest::DeleteTweet {
                tweet_id: "42".into(),
            },
            result: Ok(ActionSuccess::Deleted),
        });
        assert_eq!(follow, Some(FollowUp::RefreshRateLimit));
        assert_eq!(s.notice.expect("notice").kind, NoticeKind::Success);
        let last = s.viewer.buffer().iter().last().expect("entry");
        assert_eq!(last.level, LogLevel::Success);
    }

    #[test]
    fn manual_post_opens_url_then_asks_for_confirmation() {
        let mut s = state();
        let follow = s.apply_outcome(ActionOutcome {
            request: ActionRequest::ManualPost {
                tweet_id: "7".into(),
            },
            result: Ok(ActionSuccess::ManualShare {
                x_share_url: "https://x.com/intent/tweet?text=hi".into(),
            }),
        });
        assert_eq!(
            follow,
            Some(FollowUp::OpenUrl("https://x.com/intent/tweet?text=hi".into()))
        );
        let confirm = s.pending_confirm.expect("confirmation");
        assert_eq!(
            confirm.accept(),
            ActionRequest::ConfirmManualPost {
                tweet_id: "7".into()
            }
        );
    }

    #[test]
    fn limited_response_offers_retry() {
        let mut s = state();
        s.apply_outcome(ActionOutcome {
            request: ActionRequest::RefreshRateLimit,
            result: Ok(ActionSuccess::RateLimit(RateLimitStatusResponse {
                success: true,
                rate_limit_status: ApiRateLimit {
                    can_post: false,
                    reset_time_minutes: None,
                },
                rate_limited_tweets_count: 2,
                can_retry: true,
                error: None,
            })),
        });
        assert!(s.rate_limit.retry_available());
    }

    #[test]
    fn terminal_lines_follow_viewer_revision() {
        let mut s = state();
        assert_eq!(s.terminal_lines().len(), 1);
        s.viewer
            .append_entry(LogEntry::new("t", LogLevel::Info, "\x1b[31mred\x1b[0m"));
        let lines = s.terminal_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "red");
        s.viewer.clear();
        assert!(s.terminal_lines()[0].is_marker);
    }

    #[test]
    fn status_refresh_does_not_disable_tweet_form() {
        let mut s = state();
        s.on_request_submitted(&ActionRequest::RefreshRateLimit);
        s.mark_rate_limit_requested(Instant::now());
        assert!(!s.tweet_action_busy());

        let post = ActionRequest::PostTweet {
            tweet_id: "5".into(),
        };
        s.on_request_submitted(&post);
        assert!(s.tweet_action_busy());
        s.apply_outcome(ActionOutcome {
            request: ActionRequest::RefreshRateLimit,
            result: Err(rejected("down")),
        });
        assert!(s.tweet_action_busy());
        s.apply_outcome(ActionOutcome {
            request: post,
            result: Err(rejected("nope")),
        });
        assert!(!s.tweet_action_busy());
    }

    #[test]
    fn tweet_id_is_trimmed() {
        let mut s = state();
        assert!(s.tweet_id().is_none());
        s.tweet_id_input = "  123 ".into();
        assert_eq!(s.tweet_id().as_deref(), Some("123"));
    }
}
