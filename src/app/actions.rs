// BotConsole - app/actions.rs
//
// Action and status requests against the automation backend.
//
// `ActionClient` is the synchronous request/response layer (one method per
// endpoint). `ActionManager` runs each request on a short-lived background
// thread and hands the `ActionOutcome` back to the UI over mpsc, polled each
// frame, so the UI thread never blocks on the network.
//
// Every failure mode (network, HTTP status, unexpected body, `success:false`)
// is an `ActionError`; the UI turns each into a blocking notice.

use crate::core::rate_limit::RateLimitStatusResponse;
use crate::util::constants::{
    ACTION_REQUEST_TIMEOUT_SECS, CONFIRM_MANUAL_POST_PATH, DELETE_TWEET_PATH,
    HTTP_CONNECT_TIMEOUT_SECS, MANUAL_POST_PATH, POST_TWEET_PATH, RATE_LIMIT_STATUS_PATH,
    RETRY_RATE_LIMITED_PATH,
};
use crate::util::error::ActionError;
use serde::Deserialize;
use std::sync::mpsc;
use std::time::Duration;

// =============================================================================
// Wire types
// =============================================================================

/// Common body of the tweet action endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionResponse {
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
    pub tweet_url: Option<String>,
    pub x_share_url: Option<String>,
}

// =============================================================================
// Requests and outcomes
// =============================================================================

/// A request the UI can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    PostTweet { tweet_id: String },
    DeleteTweet { tweet_id: String },
    ManualPost { tweet_id: String },
    ConfirmManualPost { tweet_id: String },
    RetryRateLimited,
    RefreshRateLimit,
}

impl ActionRequest {
    /// Short description for notices and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::PostTweet { tweet_id } => format!("Post tweet {tweet_id}"),
            Self::DeleteTweet { tweet_id } => format!("Delete tweet {tweet_id}"),
            Self::ManualPost { tweet_id } => format!("Manual post of tweet {tweet_id}"),
            Self::ConfirmManualPost { tweet_id } => format!("Confirm manual post of tweet {tweet_id}"),
            Self::RetryRateLimited => "Retry rate-limited tweets".to_string(),
            Self::RefreshRateLimit => "Refresh rate-limit status".to_string(),
        }
    }

    /// Whether this is one of the tweet form's requests (as opposed to the
    /// rate-limit card's status refresh and retry).
    pub fn is_tweet_action(&self) -> bool {
        matches!(
            self,
            Self::PostTweet { .. }
                | Self::DeleteTweet { .. }
                | Self::ManualPost { .. }
                | Self::ConfirmManualPost { .. }
        )
    }

    /// Whether a successful run changes backend state (the UI refreshes the
    /// status panel afterwards).
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::RefreshRateLimit | Self::ManualPost { .. })
    }
}

/// Successful result of a request.
#[derive(Debug, Clone)]
pub enum ActionSuccess {
    Posted { tweet_url: Option<String> },
    Deleted,
    ManualShare { x_share_url: String },
    ManualConfirmed,
    RetryStarted,
    RateLimit(RateLimitStatusResponse),
}

/// Result message sent from an action thread to the UI thread.
#[derive(Debug)]
pub struct ActionOutcome {
    pub request: ActionRequest,
    pub result: Result<ActionSuccess, ActionError>,
}

// =============================================================================
// ActionClient (synchronous)
// =============================================================================

/// Blocking client for the backend's action and status endpoints.
#[derive(Debug, Clone)]
pub struct ActionClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl ActionClient {
    pub fn new(base_url: &str) -> Result<Self, ActionError> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(ACTION_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| ActionError::Client { source })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Run any request, mapping it to the matching endpoint call.
    pub fn execute(&self, request: &ActionRequest) -> Result<ActionSuccess, ActionError> {
        match request {
            ActionRequest::PostTweet { tweet_id } => self.post_tweet(tweet_id),
            ActionRequest::DeleteTweet { tweet_id } => {
                self.delete_tweet(tweet_id).map(|()| ActionSuccess::Deleted)
            }
            ActionRequest::ManualPost { tweet_id } => self
                .manual_post(tweet_id)
                .map(|x_share_url| ActionSuccess::ManualShare { x_share_url }),
            ActionRequest::ConfirmManualPost { tweet_id } => self
                .confirm_manual_post(tweet_id)
                .map(|()| ActionSuccess::ManualConfirmed),
            ActionRequest::RetryRateLimited => {
                self.retry_rate_limited().map(|()| ActionSuccess::RetryStarted)
            }
            ActionRequest::RefreshRateLimit => self.rate_limit_status().map(ActionSuccess::RateLimit),
        }
    }

    /// `POST /post_tweet`.
    pub fn post_tweet(&self, tweet_id: &str) -> Result<ActionSuccess, ActionError> {
        let resp = self.post_tweet_action(POST_TWEET_PATH, tweet_id)?;
        Ok(ActionSuccess::Posted {
            tweet_url: resp.tweet_url.filter(|u| !u.is_empty()),
        })
    }

    /// `POST /delete_tweet`.
    pub fn delete_tweet(&self, tweet_id: &str) -> Result<(), ActionError> {
        self.post_tweet_action(DELETE_TWEET_PATH, tweet_id).map(|_| ())
    }

    /// `POST /manual_post_tweet`; returns the share URL to open.
    pub fn manual_post(&self, tweet_id: &str) -> Result<String, ActionError> {
        let resp = self.post_tweet_action(MANUAL_POST_PATH, tweet_id)?;
        resp.x_share_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ActionError::Rejected {
                endpoint: MANUAL_POST_PATH,
                message: "Server did not return a share URL".to_string(),
            })
    }

    /// `POST /confirm_manual_post`.
    pub fn confirm_manual_post(&self, tweet_id: &str) -> Result<(), ActionError> {
        self.post_tweet_action(CONFIRM_MANUAL_POST_PATH, tweet_id)
            .map(|_| ())
    }

    /// `GET /retry_rate_limited_tweets`; success is any 2xx status.
    pub fn retry_rate_limited(&self) -> Result<(), ActionError> {
        let endpoint = RETRY_RATE_LIMITED_PATH;
        let response = self
            .http
            .get(self.url(endpoint))
            .send()
            .map_err(|source| ActionError::Request { endpoint, source })?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ActionError::Status {
                endpoint,
                status: status.as_u16(),
            })
        }
    }

    /// `GET /api/rate_limit_status`. A `success:false` body is returned as-is
    /// so the panel can show the server's error text.
    pub fn rate_limit_status(&self) -> Result<RateLimitStatusResponse, ActionError> {
        let endpoint = RATE_LIMIT_STATUS_PATH;
        let response = self
            .http
            .get(self.url(endpoint))
            .send()
            .map_err(|source| ActionError::Request { endpoint, source })?;
        decode_json(endpoint, response)
    }

    fn post_tweet_action(
        &self,
        endpoint: &'static str,
        tweet_id: &str,
    ) -> Result<ActionResponse, ActionError> {
        let response = self
            .http
            .post(self.url(endpoint))
            .json(&serde_json::json!({ "tweet_id": tweet_id }))
            .send()
            .map_err(|source| ActionError::Request { endpoint, source })?;
        let body: ActionResponse = decode_json(endpoint, response)?;
        if body.success {
            tracing::info!(endpoint, tweet_id, "Action succeeded");
            Ok(body)
        } else {
            Err(ActionError::Rejected {
                endpoint,
                message: body
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

/// Decode a JSON body. A non-JSON body on a non-2xx response is reported as
/// the status error, which is the more useful message.
fn decode_json<T: serde::de::DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::blocking::Response,
) -> Result<T, ActionError> {
    let status = response.status();
    let text = response
        .text()
        .map_err(|source| ActionError::Request { endpoint, source })?;
    match serde_json::from_str(&text) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(ActionError::Status {
            endpoint,
            status: status.as_u16(),
        }),
        Err(source) => Err(ActionError::Decode { endpoint, source }),
    }
}

// =============================================================================
// ActionManager (background)
// =============================================================================

/// Runs requests off the UI thread.
pub struct ActionManager {
    base_url: String,
    tx: mpsc::Sender<ActionOutcome>,
    rx: mpsc::Receiver<ActionOutcome>,
    in_flight: usize,
}

impl ActionManager {
    pub fn new(base_url: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            base_url: base_url.to_string(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start a request on a background thread.
    pub fn submit(&mut self, request: ActionRequest) {
        let tx = self.tx.clone();
        let base_url = self.base_url.clone();
        tracing::debug!(request = %request.describe(), "Submitting action");
        self.in_flight += 1;
        let spawned = std::thread::Builder::new()
            .name("action".to_string())
            .spawn(move || {
                let result = ActionClient::new(&base_url).and_then(|c| c.execute(&request));
                if let Err(ref e) = result {
                    tracing::warn!(request = %request.describe(), error = %e, "Action failed");
                }
                // UI gone: nothing to report to.
                let _ = tx.send(ActionOutcome { request, result });
            });
        if let Err(e) = spawned {
            tracing::error!(error = %e, "Cannot spawn action thread");
            self.in_flight -= 1;
        }
    }

    /// Drain completed requests without blocking.
    pub fn poll_outcomes(&mut self) -> Vec<ActionOutcome> {
        let outcomes: Vec<_> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Returns `true` while any request is outstanding, status refreshes
    /// included. Used for repaint scheduling only; the tweet form tracks its
    /// own requests in `AppState`.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutating_requests() {
        assert!(ActionRequest::PostTweet { tweet_id: "1".into() }.is_mutating());
        assert!(ActionRequest::RetryRateLimited.is_mutating());
        assert!(!ActionRequest::RefreshRateLimit.is_mutating());
        assert!(!ActionRequest::ManualPost { tweet_id: "1".into() }.is_mutating());
    }

    #[test]
    fn status_requests_are_not_tweet_actions() {
        assert!(ActionRequest::DeleteTweet { tweet_id: "1".into() }.is_tweet_action());
        assert!(ActionRequest::ConfirmManualPost { tweet_id: "1".into() }.is_tweet_action());
        assert!(!ActionRequest::RefreshRateLimit.is_tweet_action());
        assert!(!ActionRequest::RetryRateLimited.is_tweet_action());
    }

    #[test]
    fn action_response_tolerates_missing_fields() {
        let r: ActionResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!r.success);
        assert!(r.error.is_none());
    }

    #[test]
    fn unreachable_backend_is_a_request_error() {
        // Reserve a free port, then release it so nothing is listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = ActionClient::new(&format!("http://127.0.0.1:{port}/")).unwrap();
        let err = client.rate_limit_status().unwrap_err();
        assert!(matches!(err, ActionError::Request { .. }), "got {err:?}");
    }
}
