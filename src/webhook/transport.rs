use crate::shared::http::{agent_with_timeout, classify_transport, TransportFailure};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// One HTTP POST attempt. Non-2xx statuses are returned as responses, not
/// errors; only transport-level failures are `Err`.
pub trait WebhookTransport: Send + Sync {
    fn post_json(&self, url: &str, body: &str) -> Result<TransportResponse, TransportFailure>;
}

/// Pause between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: agent_with_timeout(timeout),
        }
    }
}

impl WebhookTransport for UreqTransport {
    fn post_json(&self, url: &str, body: &str) -> Result<TransportResponse, TransportFailure> {
        let result = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_string(body);
        match result {
            Ok(response) => {
                let status = response.status();
                Ok(TransportResponse {
                    status,
                    body: response.into_string().unwrap_or_default(),
                })
            }
            Err(ureq::Error::Status(status, response)) => Ok(TransportResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(classify_transport(&transport)),
        }
    }
}
