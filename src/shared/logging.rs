use chrono::{SecondsFormat, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const NO_TRACE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// JSON-line event log. Every line carries the trace id of the unit of work
/// that produced it so one inbound message can be followed end to end.
#[derive(Debug, Clone, Default)]
pub struct RelayLog {
    file: Option<PathBuf>,
    stdout: bool,
}

impl RelayLog {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file, stdout: true }
    }

    /// File-only sink, used where stdout noise is unwanted.
    pub fn file_only(path: &Path) -> Self {
        Self {
            file: Some(path.to_path_buf()),
            stdout: false,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn info(&self, trace_id: &str, event: &str, message: &str) {
        self.append(LogLevel::Info, trace_id, event, message);
    }

    pub fn warn(&self, trace_id: &str, event: &str, message: &str) {
        self.append(LogLevel::Warn, trace_id, event, message);
    }

    pub fn error(&self, trace_id: &str, event: &str, message: &str) {
        self.append(LogLevel::Error, trace_id, event, message);
    }

    pub fn append(&self, level: LogLevel, trace_id: &str, event: &str, message: &str) {
        let Some(line) = render_log_line(level, trace_id, event, message) else {
            return;
        };
        if self.stdout {
            println!("{line}");
        }
        if let Some(path) = self.file.as_deref() {
            append_line(path, &line);
        }
    }
}

pub fn render_log_line(
    level: LogLevel,
    trace_id: &str,
    event: &str,
    message: &str,
) -> Option<String> {
    let trace_id = if trace_id.trim().is_empty() {
        NO_TRACE
    } else {
        trace_id
    };
    let payload = serde_json::json!({
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "level": level.as_str(),
        "trace_id": trace_id,
        "event": event,
        "message": message,
    });
    serde_json::to_string(&payload).ok()
}

fn append_line(path: &Path, line: &str) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
