// BotConsole - core/rate_limit.rs
//
// Display model for the backend's rate-limit status endpoint.
// The backend decides what "rate limited" means; this only maps its answer
// to what the panel shows and whether the retry button is offered.

use serde::Deserialize;

/// `rate_limit_status` object of the status response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiRateLimit {
    pub can_post: bool,
    pub reset_time_minutes: Option<f64>,
}

/// Body of `GET /api/rate_limit_status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RateLimitStatusResponse {
    pub success: bool,
    pub rate_limit_status: ApiRateLimit,
    pub rate_limited_tweets_count: u64,
    pub can_retry: bool,
    pub error: Option<String>,
}

/// What the rate-limit panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum RateLimitView {
    /// No status fetched yet.
    Loading,
    /// No tweets are held back.
    Clear,
    /// Some tweets are held back by the rate limit.
    Limited {
        count: u64,
        can_post: bool,
        reset_minutes: Option<f64>,
        can_retry: bool,
    },
    /// The backend answered `success: false`.
    Failed(String),
    /// The backend could not be reached or answered garbage.
    Unreachable,
}

impl RateLimitView {
    pub fn from_response(resp: &RateLimitStatusResponse) -> Self {
        if !resp.success {
            return Self::Failed(
                resp.error
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            );
        }
        if resp.rate_limited_tweets_count == 0 {
            return Self::Clear;
        }
        Self::Limited {
            count: resp.rate_limited_tweets_count,
            can_post: resp.rate_limit_status.can_post,
            reset_minutes: resp.rate_limit_status.reset_time_minutes,
            can_retry: resp.can_retry,
        }
    }

    /// Whether the "retry rate-limited tweets" button is offered.
    pub fn retry_available(&self) -> bool {
        matches!(self, Self::Limited { can_retry: true, .. })
    }

    /// Remaining wait text. Only meaningful while the API cannot post.
    pub fn reset_label(reset_minutes: Option<f64>) -> String {
        match reset_minutes {
            Some(m) if m > 0.0 => format!("{} minutes", m.ceil() as i64),
            _ => "Unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RateLimitView {
        let resp: RateLimitStatusResponse = serde_json::from_str(json).expect("valid json");
        RateLimitView::from_response(&resp)
    }

    #[test]
    fn zero_count_is_clear_without_retry() {
        let v = parse(
            r#"{"success":true,"rate_limit_status":{"can_post":true},"rate_limited_tweets_count":0,"can_retry":true}"#,
        );
        assert_eq!(v, RateLimitView::Clear);
        assert!(!v.retry_available());
    }

    #[test]
    fn limited_with_retry() {
        let v = parse(
            r#"{"success":true,"rate_limit_status":{"can_post":false,"reset_time_minutes":12},"rate_limited_tweets_count":3,"can_retry":true}"#,
        );
        assert_eq!(
            v,
            RateLimitView::Limited {
                count: 3,
                can_post: false,
                reset_minutes: Some(12.0),
                can_retry: true
            }
        );
        assert!(v.retry_available());
    }

    #[test]
    fn limited_without_retry_hides_button() {
        let v = parse(
            r#"{"success":true,"rate_limit_status":{"can_post":true},"rate_limited_tweets_count":2,"can_retry":false}"#,
        );
        assert!(!v.retry_available());
    }

    #[test]
    fn failure_uses_server_error_or_default() {
        assert_eq!(
            parse(r#"{"success":false,"error":"db locked"}"#),
            RateLimitView::Failed("db locked".to_string())
        );
        assert_eq!(
            parse(r#"{"success":false}"#),
            RateLimitView::Failed("Unknown error".to_string())
        );
    }

    #[test]
    fn reset_label_handles_missing_value() {
        assert_eq!(RateLimitView::reset_label(None), "Unknown");
        assert_eq!(RateLimitView::reset_label(Some(4.2)), "5 minutes");
    }

    #[test]
    fn zero_reset_time_is_unknown() {
        assert_eq!(RateLimitView::reset_label(Some(0.0)), "Unknown");
        assert_eq!(RateLimitView::reset_label(Some(-1.0)), "Unknown");
        assert_eq!(RateLimitView::reset_label(Some(0.1)), "1 minutes");
        let view = parse(
            r#"{"success":true,"rate_limit_status":{"can_post":false,"reset_time_minutes":0},
                "rate_limited_tweets_count":1,"can_retry":false}"#,
        );
        let RateLimitView::Limited { reset_minutes, .. } = view else {
            panic!("expected limited view, got {view:?}");
        };
        assert_eq!(RateLimitView::reset_label(reset_minutes), "Unknown");
    }
}
