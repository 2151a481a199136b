//! Session events
//!
//! Sessions report progress through an unbounded channel; the presentation
//! layer turns the stream into the stage-by-stage narrative.

use crate::domain::models::{SessionStatus, Stage, StageResult};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum AppEvent {
    StageStarted {
        device: String,
        stage: Stage,
    },
    AttemptFailed {
        device: String,
        stage: Stage,
        attempt: u32,
        max_attempts: u32,
        detail: String,
    },
    StageFinished {
        device: String,
        result: StageResult,
    },
    SessionFinished {
        device: String,
        status: SessionStatus,
    },
    LogMessage(StatusMessage),
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Event sender bound to one device's display name
#[derive(Debug, Clone)]
pub struct Reporter {
    device: String,
    event_sender: EventSender,
}

impl Reporter {
    pub fn new(device: impl Into<String>, event_sender: EventSender) -> Self {
        Self {
            device: device.into(),
            event_sender,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn stage_started(&self, stage: Stage) {
        self.send(AppEvent::StageStarted {
            device: self.device.clone(),
            stage,
        });
    }

    pub fn attempt_failed(&self, stage: Stage, attempt: u32, max_attempts: u32, detail: &str) {
        self.send(AppEvent::AttemptFailed {
            device: self.device.clone(),
            stage,
            attempt,
            max_attempts,
            detail: detail.to_string(),
        });
    }

    pub fn stage_finished(&self, result: &StageResult) {
        self.send(AppEvent::StageFinished {
            device: self.device.clone(),
            result: result.clone(),
        });
    }

    pub fn session_finished(&self, status: SessionStatus) {
        self.send(AppEvent::SessionFinished {
            device: self.device.clone(),
            status,
        });
    }

    pub fn log(&self, message: impl Into<String>, severity: MessageSeverity) {
        self.send(AppEvent::LogMessage(StatusMessage {
            message: format!("[{}] {}", self.device, message.into()),
            severity,
        }));
    }

    // A closed narrator must never fail a session
    fn send(&self, event: AppEvent) {
        let _ = self.event_sender.send(event);
    }
}
