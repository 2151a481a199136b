//! Stage narrative on stdout
//!
//! Consumes the session event stream until every sender is gone.

use crate::domain::events::{AppEvent, MessageSeverity};
use crate::domain::models::{SessionStatus, StageResultKind};
use std::io::Write;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One narrative line per event
pub fn describe(event: &AppEvent) -> String {
    match event {
        AppEvent::StageStarted { device, stage } => format!("[{}] -> {}", device, stage),
        AppEvent::AttemptFailed {
            device,
            stage,
            attempt,
            max_attempts,
            detail,
        } => format!(
            "[{}]    {} attempt {}/{} failed: {}",
            device, stage, attempt, max_attempts, detail
        ),
        AppEvent::StageFinished { device, result } => {
            let mark = match result.kind {
                StageResultKind::Success => "ok",
                StageResultKind::Retryable => "warn",
                StageResultKind::Fatal => "FAILED",
            };
            format!("[{}]    {} {}: {}", device, mark, result.stage, result.detail)
        }
        AppEvent::SessionFinished { device, status } => match status {
            SessionStatus::Connected => format!("[{}] connected", device),
            SessionStatus::Failed => format!("[{}] FAILED", device),
        },
        AppEvent::LogMessage(status) => {
            let prefix = match status.severity {
                MessageSeverity::Info | MessageSeverity::Success => "",
                MessageSeverity::Warning => "warning: ",
                MessageSeverity::Error => "error: ",
            };
            format!("{}{}", prefix, status.message)
        }
    }
}

/// Print events to stdout until the channel closes
pub fn spawn(mut events: mpsc::UnboundedReceiver<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{}", describe(&event));
        }
    })
}
