//! Orchestrator
//!
//! Validates the selected devices, runs one session per device (one after
//! another or all at once) and folds the outcomes into a [`RunSummary`].

use crate::domain::error::ConfigError;
use crate::domain::events::{AppEvent, EventSender, MessageSeverity, StatusMessage};
use crate::domain::models::{DeviceSpec, ExecutionMode, RunSummary, SessionOutcome};
use crate::domain::session::DeviceSession;
use crate::domain::settings::ConnectionSettings;
use crate::domain::transport::{InterfaceStatus, Transports};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

pub struct Orchestrator {
    transports: Transports,
    settings: Arc<ConnectionSettings>,
    event_sender: EventSender,
}

/// Result of a one-off reachability probe
#[derive(Debug, Clone, Serialize)]
pub struct Reachability {
    pub id: String,
    pub name: String,
    pub interface: String,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        self.status_code == Some(200)
    }
}

impl Orchestrator {
    pub fn new(
        transports: Transports,
        settings: Arc<ConnectionSettings>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            transports,
            settings,
            event_sender,
        }
    }

    /// Check the selection against the host before any radio traffic
    pub async fn validate(
        &self,
        devices: &[Arc<DeviceSpec>],
        mode: ExecutionMode,
    ) -> Result<(), ConfigError> {
        if devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }

        for device in devices {
            let status = self
                .transports
                .network
                .interface_status(&device.interface)
                .await
                .map_err(|source| ConfigError::Inspect {
                    interface: device.interface.clone(),
                    source,
                })?;

            match status {
                InterfaceStatus::Ready => {}
                InterfaceStatus::Missing => {
                    return Err(ConfigError::MissingInterface {
                        device: device.id.clone(),
                        interface: device.interface.clone(),
                    })
                }
                InterfaceStatus::NotWireless => {
                    return Err(ConfigError::NotWireless {
                        device: device.id.clone(),
                        interface: device.interface.clone(),
                    })
                }
            }
        }

        if mode == ExecutionMode::Concurrent {
            let mut owners: HashMap<&str, &str> = HashMap::new();
            for device in devices {
                if let Some(first) = owners.insert(&device.interface, &device.id) {
                    return Err(ConfigError::SharedInterface {
                        interface: device.interface.clone(),
                        first: first.to_string(),
                        second: device.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub async fn run(
        &self,
        devices: Vec<Arc<DeviceSpec>>,
        mode: ExecutionMode,
        timeout: Option<Duration>,
    ) -> Result<RunSummary, ConfigError> {
        self.validate(&devices, mode).await?;

        let deadline = timeout.map(|t| Instant::now() + t);
        info!(
            "Connecting {} device(s) in {:?} mode{}",
            devices.len(),
            mode,
            timeout
                .map(|t| format!(", deadline {:?}", t))
                .unwrap_or_default()
        );

        let outcomes = match mode {
            ExecutionMode::Sequential => self.run_sequential(devices, deadline).await,
            ExecutionMode::Concurrent => self.run_concurrent(devices, deadline).await,
        };

        let summary = RunSummary::from_outcomes(outcomes);
        info!(
            "Run finished: {:?} ({} connected, {} failed)",
            summary.status,
            summary.connected().count(),
            summary.failed().count()
        );
        Ok(summary)
    }

    async fn run_sequential(
        &self,
        devices: Vec<Arc<DeviceSpec>>,
        deadline: Option<Instant>,
    ) -> Vec<SessionOutcome> {
        let mut outcomes = Vec::with_capacity(devices.len());

        for (index, device) in devices.into_iter().enumerate() {
            if index > 0 {
                let settle = self.settings.between_sessions();
                match deadline {
                    Some(deadline) => {
                        tokio::time::sleep_until(deadline.min(Instant::now() + settle)).await
                    }
                    None => tokio::time::sleep(settle).await,
                }
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("[{}] Run deadline passed before session start", device.name);
                self.notify(
                    format!("[{}] Skipped: run deadline passed", device.name),
                    MessageSeverity::Error,
                );
                outcomes.push(SessionOutcome::timed_out(device));
                continue;
            }

            outcomes.push(self.session(device, deadline).run().await);
        }

        outcomes
    }

    async fn run_concurrent(
        &self,
        devices: Vec<Arc<DeviceSpec>>,
        deadline: Option<Instant>,
    ) -> Vec<SessionOutcome> {
        let handles: Vec<_> = devices
            .into_iter()
            .map(|device| {
                let session = self.session(Arc::clone(&device), deadline);
                (device, tokio::spawn(session.run()))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (device, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("[{}] Session task failed: {}", device.name, e);
                    self.notify(
                        format!("[{}] Session aborted: {}", device.name, e),
                        MessageSeverity::Error,
                    );
                    outcomes.push(SessionOutcome::aborted(device, e));
                }
            }
        }

        outcomes
    }

    /// One short status probe per device, all in parallel
    pub async fn check_reachability(&self, devices: &[Arc<DeviceSpec>]) -> Vec<Reachability> {
        let timeout = self.settings.existing_probe_timeout();

        let handles: Vec<_> = devices
            .iter()
            .map(|device| {
                let http = Arc::clone(&self.transports.http);
                let url = device.status_url(&self.settings.status_path);
                let device = Arc::clone(device);
                tokio::spawn(async move {
                    let probe = tokio::time::timeout(
                        timeout,
                        http.probe(&device.interface, &url, timeout),
                    )
                    .await;
                    let (status_code, error) = match probe {
                        Ok(Ok(code)) => (Some(code), None),
                        Ok(Err(e)) => (None, Some(e.to_string())),
                        Err(_) => (None, Some(format!("timed out after {:?}", timeout))),
                    };
                    Reachability {
                        id: device.id.clone(),
                        name: device.name.clone(),
                        interface: device.interface.clone(),
                        status_code,
                        error,
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (device, handle) in devices.iter().zip(handles) {
            let result = handle.await.unwrap_or_else(|e| Reachability {
                id: device.id.clone(),
                name: device.name.clone(),
                interface: device.interface.clone(),
                status_code: None,
                error: Some(e.to_string()),
            });
            results.push(result);
        }
        results
    }

    fn session(&self, device: Arc<DeviceSpec>, deadline: Option<Instant>) -> DeviceSession {
        DeviceSession::new(
            device,
            self.transports.clone(),
            Arc::clone(&self.settings),
            self.event_sender.clone(),
            deadline,
        )
    }

    fn notify(&self, message: String, severity: MessageSeverity) {
        let _ = self
            .event_sender
            .send(AppEvent::LogMessage(StatusMessage { message, severity }));
    }
}
