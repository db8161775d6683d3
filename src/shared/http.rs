use std::error::Error as _;
use std::time::Duration;

/// Transport-level failure classes shared by every outbound HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Connection(String),
    Request(String),
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connection(message) => write!(f, "connection error: {message}"),
            Self::Request(message) => write!(f, "request error: {message}"),
        }
    }
}

pub fn agent_with_timeout(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

pub fn classify_transport(error: &ureq::Transport) -> TransportFailure {
    if is_timeout(error) {
        return TransportFailure::Timeout;
    }
    match error.kind() {
        ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => {
            TransportFailure::Connection(error.to_string())
        }
        _ => TransportFailure::Request(error.to_string()),
    }
}

fn is_timeout(error: &ureq::Transport) -> bool {
    if let Some(io) = error
        .source()
        .and_then(|source| source.downcast_ref::<std::io::Error>())
    {
        if matches!(
            io.kind(),
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
        ) {
            return true;
        }
    }
    error.kind() == ureq::ErrorKind::Io && error.to_string().contains("timed out")
}
