use crate::config::Settings;
use crate::shared::http::TransportFailure;
use crate::shared::truncate_chars;
use serde::Serialize;
use std::time::Duration;

pub mod transport;

pub use transport::{Sleeper, ThreadSleeper, TransportResponse, UreqTransport, WebhookTransport};

/// Multipliers of [`RetryPolicy::delay_unit`] before the first and second
/// retry. Retries past the table reuse the last step.
pub const RETRY_DELAY_STEPS: [u32; 2] = [1, 2];
pub const STATUS_WEBHOOK_VAR: &str = "MAKE_STATUS_WEBHOOK_URL";
const REJECTED_BODY_CHARS: usize = 200;
const FAILURE_MESSAGE_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay_unit: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            retries: settings.tunables.make_retries,
            delay_unit: settings.tunables.retry_delay_unit(),
            timeout: settings.tunables.webhook_timeout(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Pause before retry number `retry` (1-based).
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let index = (retry.max(1) as usize - 1).min(RETRY_DELAY_STEPS.len() - 1);
        self.delay_unit * RETRY_DELAY_STEPS[index]
    }
}

/// Last observed reason of a retryable failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    HttpStatus(u16),
    Timeout,
    Connection(String),
    Request(String),
}

impl From<TransportFailure> for FailureReason {
    fn from(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::Timeout => Self::Timeout,
            TransportFailure::Connection(message) => {
                Self::Connection(truncate_chars(&message, FAILURE_MESSAGE_CHARS).to_string())
            }
            TransportFailure::Request(message) => {
                Self::Request(truncate_chars(&message, FAILURE_MESSAGE_CHARS).to_string())
            }
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "HTTP {status}"),
            Self::Timeout => write!(f, "timeout"),
            Self::Connection(message) => write!(f, "connection error: {message}"),
            Self::Request(message) => write!(f, "request error: {message}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook rejected payload with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("webhook failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: FailureReason },
    #[error("`{target}` is not configured")]
    NotConfigured { target: &'static str },
    #[error("failed to encode webhook payload: {0}")]
    Encode(#[source] serde_json::Error),
}

impl WebhookError {
    /// True for failures no retry could fix.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Exhausted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempts: u32,
    pub status: u16,
}

/// At-least-once POST delivery with a fixed, short retry schedule.
///
/// 2xx ends delivery, 4xx is terminal, and 5xx or transport failures are
/// retried until `retries + 1` attempts have been made.
#[derive(Debug, Clone)]
pub struct WebhookDelivery<T = UreqTransport, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl WebhookDelivery<UreqTransport, ThreadSleeper> {
    pub fn from_settings(settings: &Settings) -> Self {
        let policy = RetryPolicy::from_settings(settings);
        Self::with_parts(UreqTransport::new(policy.timeout), ThreadSleeper, policy)
    }
}

impl<T: WebhookTransport, S: Sleeper> WebhookDelivery<T, S> {
    pub fn with_parts(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn deliver<P: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &P,
    ) -> Result<DeliveryReport, WebhookError> {
        let body = serde_json::to_string(payload).map_err(WebhookError::Encode)?;
        let max_attempts = self.policy.max_attempts();
        let mut last = FailureReason::Request("no attempt made".to_string());

        for attempt in 1..=max_attempts {
            match self.transport.post_json(url, &body) {
                Ok(response) if (200..300).contains(&response.status) => {
                    return Ok(DeliveryReport {
                        attempts: attempt,
                        status: response.status,
                    });
                }
                Ok(response) if (400..500).contains(&response.status) => {
                    return Err(WebhookError::Rejected {
                        status: response.status,
                        body: truncate_chars(&response.body, REJECTED_BODY_CHARS).to_string(),
                    });
                }
                Ok(response) => last = FailureReason::HttpStatus(response.status),
                Err(failure) => last = FailureReason::from(failure),
            }

            if attempt < max_attempts {
                self.sleeper.sleep(self.policy.delay_before_retry(attempt));
            }
        }

        Err(WebhookError::Exhausted {
            attempts: max_attempts,
            last,
        })
    }

    /// Same mechanism for the status endpoint; an unset URL fails before any
    /// network attempt.
    pub fn deliver_status<P: Serialize + ?Sized>(
        &self,
        url: Option<&str>,
        payload: &P,
    ) -> Result<DeliveryReport, WebhookError> {
        let url = url
            .filter(|url| !url.trim().is_empty())
            .ok_or(WebhookError::NotConfigured {
                target: STATUS_WEBHOOK_VAR,
            })?;
        self.deliver(url, payload)
    }
}
