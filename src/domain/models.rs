use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

/// One camera and the interface it is reached through
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceSpec {
    /// Short identifier used to select the device on the command line
    pub id: String,
    /// Display name used in the narrative and summary
    pub name: String,
    /// BLE hardware address, e.g. "D0:21:F8:9C:FF:80"
    pub ble_address: String,
    pub ssid: String,
    #[serde(default)]
    pub psk: String,
    /// Address the camera answers on once its access point is joined
    pub device_address: Ipv4Addr,
    pub interface: String,
    /// Credential file for this interface; derived from the interface when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    /// Fixed fallback address used instead of the derived one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_address: Option<Ipv4Addr>,
}

impl DeviceSpec {
    pub fn credential_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "/etc/wpa_supplicant/wpa_supplicant_{}.conf",
                self.interface
            ))
        })
    }

    /// Status endpoint URL for the camera's control API
    pub fn status_url(&self, path: &str) -> String {
        format!("http://{}{}", self.device_address, path)
    }
}

/// Pipeline stages, in the only order a session may run them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    ProbeExisting,
    AwaitAdvertising,
    ActivateWifi,
    SettleWifiStart,
    PrepareInterface,
    Associate,
    AcquireAddress,
    InstallRoute,
    VerifyReachable,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ProbeExisting => "probe existing connection",
            Self::AwaitAdvertising => "await BLE advertising",
            Self::ActivateWifi => "activate Wi-Fi over BLE",
            Self::SettleWifiStart => "wait for access point",
            Self::PrepareInterface => "prepare interface",
            Self::Associate => "associate",
            Self::AcquireAddress => "acquire address",
            Self::InstallRoute => "install route",
            Self::VerifyReachable => "verify HTTP API",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageResultKind {
    Success,
    /// Failure that did not end the session
    Retryable,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: Stage,
    pub kind: StageResultKind,
    pub detail: String,
    pub attempts: u32,
}

impl StageResult {
    pub fn success(stage: Stage, detail: impl Into<String>, attempts: u32) -> Self {
        Self {
            stage,
            kind: StageResultKind::Success,
            detail: detail.into(),
            attempts,
        }
    }

    pub fn retryable(stage: Stage, detail: impl Into<String>, attempts: u32) -> Self {
        Self {
            stage,
            kind: StageResultKind::Retryable,
            detail: detail.into(),
            attempts,
        }
    }

    pub fn fatal(stage: Stage, detail: impl Into<String>, attempts: u32) -> Self {
        Self {
            stage,
            kind: StageResultKind::Fatal,
            detail: detail.into(),
            attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == StageResultKind::Success
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == StageResultKind::Fatal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Connected,
    Failed,
}

/// Terminal result of one device session
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    #[serde(serialize_with = "serialize_device")]
    pub device: Arc<DeviceSpec>,
    pub status: SessionStatus,
    pub stages: Vec<StageResult>,
    pub total_attempts: u32,
    /// Local address the interface ended up with, when one was obtained
    pub address: Option<Ipv4Addr>,
    /// Why the session ended when no stage result says so
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// Reports identify the device without echoing its credential
fn serialize_device<S: Serializer>(
    device: &Arc<DeviceSpec>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Device", 4)?;
    state.serialize_field("id", &device.id)?;
    state.serialize_field("name", &device.name)?;
    state.serialize_field("interface", &device.interface)?;
    state.serialize_field("device_address", &device.device_address)?;
    state.end()
}

impl SessionOutcome {
    pub fn new(
        device: Arc<DeviceSpec>,
        status: SessionStatus,
        stages: Vec<StageResult>,
        address: Option<Ipv4Addr>,
    ) -> Self {
        let total_attempts = stages.iter().map(|s| s.attempts).sum();
        Self {
            device,
            status,
            stages,
            total_attempts,
            address,
            detail: None,
        }
    }

    /// Outcome for a session the run deadline cut off before it started
    pub fn timed_out(device: Arc<DeviceSpec>) -> Self {
        Self::ended(device, "timed out before start (run deadline passed)")
    }

    /// Outcome for a session whose task died before reporting
    pub fn aborted(device: Arc<DeviceSpec>, reason: impl std::fmt::Display) -> Self {
        Self::ended(device, format!("session aborted: {}", reason))
    }

    fn ended(device: Arc<DeviceSpec>, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(device, SessionStatus::Failed, Vec::new(), None)
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }

    /// Last stage that did not succeed
    pub fn last_failure(&self) -> Option<&StageResult> {
        self.stages.iter().rev().find(|s| !s.is_success())
    }

    /// Human readable reason for a failed session
    pub fn failure_detail(&self) -> String {
        match self.last_failure() {
            Some(result) => format!("{}: {}", result.stage, result.detail),
            None => self
                .detail
                .clone()
                .unwrap_or_else(|| "unknown failure".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    AllConnected,
    PartialFailure,
    AllFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub outcomes: Vec<SessionOutcome>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: Vec<SessionOutcome>) -> Self {
        let connected = outcomes.iter().filter(|o| o.is_connected()).count();
        let status = if connected == outcomes.len() && !outcomes.is_empty() {
            RunStatus::AllConnected
        } else if connected == 0 {
            RunStatus::AllFailed
        } else {
            RunStatus::PartialFailure
        };
        Self { status, outcomes }
    }

    pub fn exit_code(&self) -> u8 {
        match self.status {
            RunStatus::AllConnected => 0,
            RunStatus::PartialFailure | RunStatus::AllFailed => 1,
        }
    }

    pub fn connected(&self) -> impl Iterator<Item = &SessionOutcome> {
        self.outcomes.iter().filter(|o| o.is_connected())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SessionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_connected())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Concurrent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str) -> Arc<DeviceSpec> {
        Arc::new(DeviceSpec {
            id: id.to_string(),
            name: id.to_uppercase(),
            ble_address: "D0:21:F8:9C:FF:80".to_string(),
            ssid: format!("HERO8 {}", id),
            psk: "secret".to_string(),
            device_address: Ipv4Addr::new(10, 5, 5, 9),
            interface: "wlan0".to_string(),
            config_path: None,
            static_address: None,
        })
    }

    fn outcome(id: &str, status: SessionStatus) -> SessionOutcome {
        SessionOutcome::new(device(id), status, Vec::new(), None)
    }

    #[test]
    fn test_partial_failure_summary() {
        let summary = RunSummary::from_outcomes(vec![
            outcome("a", SessionStatus::Connected),
            outcome("b", SessionStatus::Failed),
            outcome("c", SessionStatus::Connected),
        ]);
        assert_eq!(summary.status, RunStatus::PartialFailure);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.connected().count(), 2);
        assert_eq!(summary.failed().next().unwrap().device.id, "b");
    }

    #[test]
    fn test_all_connected_and_all_failed() {
        let ok = RunSummary::from_outcomes(vec![outcome("a", SessionStatus::Connected)]);
        assert_eq!(ok.status, RunStatus::AllConnected);
        assert_eq!(ok.exit_code(), 0);

        let failed = RunSummary::from_outcomes(vec![
            outcome("a", SessionStatus::Failed),
            outcome("b", SessionStatus::Failed),
        ]);
        assert_eq!(failed.status, RunStatus::AllFailed);
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn test_total_attempts_and_last_failure() {
        let stages = vec![
            StageResult::success(Stage::AwaitAdvertising, "waited", 0),
            StageResult::success(Stage::ActivateWifi, "ok", 2),
            StageResult::retryable(Stage::InstallRoute, "route busy", 1),
            StageResult::fatal(Stage::VerifyReachable, "HTTP 503", 5),
        ];
        let outcome = SessionOutcome::new(device("a"), SessionStatus::Failed, stages, None);
        assert_eq!(outcome.total_attempts, 8);
        assert_eq!(outcome.last_failure().unwrap().stage, Stage::VerifyReachable);
        assert_eq!(outcome.failure_detail(), "verify HTTP API: HTTP 503");
    }

    #[test]
    fn test_stageless_outcomes_say_why_they_ended() {
        let skipped = SessionOutcome::timed_out(device("a"));
        assert_eq!(skipped.status, SessionStatus::Failed);
        assert_eq!(
            skipped.failure_detail(),
            "timed out before start (run deadline passed)"
        );

        let aborted = SessionOutcome::aborted(device("b"), "task 7 panicked");
        assert_eq!(aborted.failure_detail(), "session aborted: task 7 panicked");
        assert!(!aborted.failure_detail().contains("timed out"));

        let bare = SessionOutcome::new(device("c"), SessionStatus::Failed, Vec::new(), None);
        assert_eq!(bare.failure_detail(), "unknown failure");
    }

    #[test]
    fn test_credential_path_defaults_to_interface() {
        let camera = device("a");
        assert_eq!(
            camera.credential_path(),
            PathBuf::from("/etc/wpa_supplicant/wpa_supplicant_wlan0.conf")
        );
        assert_eq!(
            camera.status_url("/gp/gpControl/status"),
            "http://10.5.5.9/gp/gpControl/status"
        );
    }

    #[test]
    fn test_summary_json_omits_credential() {
        let summary = RunSummary::from_outcomes(vec![outcome("a", SessionStatus::Connected)]);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"AllConnected\""));
        assert!(json.contains("\"interface\":\"wlan0\""));
        assert!(!json.contains("secret"));
    }
}
