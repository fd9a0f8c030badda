//! Retrying fetch for hosted inference endpoints.
//!
//! Two failure modes are retried, each with its own policy:
//! - a "model is currently loading" error body waits the server-advertised
//!   time (at least [`MIN_LOADING_WAIT`]) and retries without spending an
//!   attempt;
//! - a transport failure or a non-JSON error body (gateway pages) spends an
//!   attempt and waits with exponential backoff.
//!
//! Any other non-success response is returned as [`AnnounceError::Api`]
//! right away.

use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    wire::UpstreamErrorShape, AnnounceError, AttemptError, RetryPolicy, RetryRequest, Result,
};

/// Substring of the upstream error message that marks a cold start.
pub const MODEL_LOADING_MARKER: &str = "currently loading";

/// Shortest pause between two "currently loading" responses.
pub const MIN_LOADING_WAIT: Duration = Duration::from_secs(1);

/// How a non-success response body is handled.
#[derive(Clone, Debug, PartialEq)]
pub enum UpstreamCondition {
    /// Model cold start; retry after the given wait without spending an attempt.
    Loading { wait: Duration },
    /// Parseable error; surfaced to the caller as-is with a normalized body.
    Hard { body: String },
    /// Body is not JSON; retried like a transport failure.
    Unreadable,
}

/// Classifies the body of a non-success response.
pub fn classify_error_body(body: &str) -> UpstreamCondition {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return UpstreamCondition::Unreadable;
    };

    let shape: UpstreamErrorShape = serde_json::from_value(json.clone()).unwrap_or_default();
    let loading = shape
        .error
        .as_deref()
        .is_some_and(|message| message.contains(MODEL_LOADING_MARKER));

    if loading {
        UpstreamCondition::Loading {
            wait: loading_wait(shape.estimated_time),
        }
    } else {
        UpstreamCondition::Hard {
            body: json.to_string(),
        }
    }
}

/// Rounds the advertised `estimated_time` (seconds) up to whole seconds,
/// never below [`MIN_LOADING_WAIT`].
pub fn loading_wait(estimated_time: Option<f64>) -> Duration {
    let advertised = match estimated_time {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
            Duration::from_secs(seconds.ceil() as u64)
        }
        _ => Duration::ZERO,
    };
    advertised.max(MIN_LOADING_WAIT)
}

/// Sends `request` until it succeeds, the attempt budget runs out, a hard
/// upstream error is returned, or `cancel` fires.
///
/// Returns the first response with a success status.
pub async fn fetch_with_retry(
    http: &reqwest::Client,
    request: &RetryRequest,
    policy: &RetryPolicy,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<reqwest::Response> {
    let max_attempts = policy.attempts();
    let mut attempt = 0u32;
    let mut loading_waits = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(AnnounceError::Cancelled);
        }

        tracing::debug!(
            url = request.url(),
            attempt = attempt + 1,
            max_attempts,
            "sending inference request"
        );

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnnounceError::Cancelled),
            sent = send_once(http, request, timeout) => sent,
        };

        let failure = match sent {
            Ok(Outcome::Success(response)) => {
                if attempt > 0 || loading_waits > 0 {
                    tracing::info!(
                        attempts = attempt + 1,
                        loading_waits,
                        "inference request succeeded after retrying"
                    );
                }
                return Ok(response);
            }
            Ok(Outcome::Rejected { status, body }) => match classify_error_body(&body) {
                UpstreamCondition::Loading { wait } => {
                    loading_waits += 1;
                    tracing::info!(
                        wait_secs = wait.as_secs(),
                        "model is loading, retrying in {} seconds",
                        wait.as_secs()
                    );
                    wait_or_cancel(wait, cancel).await?;
                    continue;
                }
                UpstreamCondition::Hard { body } => {
                    tracing::warn!(
                        status = status.as_u16(),
                        body = body.as_str(),
                        "inference API returned an error"
                    );
                    return Err(AnnounceError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }
                UpstreamCondition::Unreadable => AttemptError::UnreadableBody {
                    status: status.as_u16(),
                    body,
                },
            },
            Err(err) => AttemptError::Transport(err),
        };

        attempt += 1;
        tracing::warn!(
            attempt,
            max_attempts,
            error = %failure,
            "attempt {attempt} failed"
        );

        if attempt >= max_attempts {
            tracing::error!(attempts = attempt, "giving up on inference request");
            return Err(AnnounceError::RetriesExhausted {
                attempts: attempt,
                source: failure,
            });
        }

        let delay = policy.backoff_delay(attempt - 1);
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            "retrying in {:.1} seconds",
            delay.as_secs_f64()
        );
        wait_or_cancel(delay, cancel).await?;
    }
}

enum Outcome {
    Success(reqwest::Response),
    Rejected { status: StatusCode, body: String },
}

async fn send_once(
    http: &reqwest::Client,
    request: &RetryRequest,
    timeout: Duration,
) -> std::result::Result<Outcome, reqwest::Error> {
    let response = request.to_builder(http, timeout).send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(Outcome::Success(response));
    }
    let body = response.text().await?;
    Ok(Outcome::Rejected { status, body })
}

async fn wait_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AnnounceError::Cancelled),
        _ = sleep(delay) => Ok(()),
    }
}
