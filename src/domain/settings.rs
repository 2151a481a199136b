use crate::domain::addressing::AddressingSettings;
use crate::domain::error::ConfigError;
use crate::domain::models::{DeviceSpec, ExecutionMode};
use crate::domain::policy::StagePolicies;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_false")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_false(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_false(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("gopro-connect").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
        .to_string_lossy()
        .into_owned()
}
fn default_prefix() -> String {
    "gopro_connect".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// Timing and policy knobs for device sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionSettings {
    #[serde(default = "default_mode")]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,

    // Fixed delays
    #[serde(default = "default_advertising_settle_ms")]
    pub advertising_settle_ms: u64,
    #[serde(default = "default_wifi_start_settle_ms")]
    pub wifi_start_settle_ms: u64,
    #[serde(default = "default_between_sessions_ms")]
    pub between_sessions_ms: u64,

    // Addressing
    #[serde(default = "default_lease_timeout_ms")]
    pub lease_timeout_ms: u64,
    #[serde(default = "default_static_assign_timeout_ms")]
    pub static_assign_timeout_ms: u64,
    #[serde(default)]
    pub addressing: AddressingSettings,

    // Verification
    #[serde(default = "default_status_path")]
    pub status_path: String,
    #[serde(default = "default_false")]
    pub skip_if_reachable: bool,
    #[serde(default = "default_existing_probe_timeout_ms")]
    pub existing_probe_timeout_ms: u64,

    #[serde(default)]
    pub policies: StagePolicies,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            run_timeout_secs: None,
            advertising_settle_ms: default_advertising_settle_ms(),
            wifi_start_settle_ms: default_wifi_start_settle_ms(),
            between_sessions_ms: default_between_sessions_ms(),
            lease_timeout_ms: default_lease_timeout_ms(),
            static_assign_timeout_ms: default_static_assign_timeout_ms(),
            addressing: AddressingSettings::default(),
            status_path: default_status_path(),
            skip_if_reachable: default_false(),
            existing_probe_timeout_ms: default_existing_probe_timeout_ms(),
            policies: StagePolicies::default(),
        }
    }
}

impl ConnectionSettings {
    pub fn advertising_settle(&self) -> Duration {
        Duration::from_millis(self.advertising_settle_ms)
    }

    pub fn wifi_start_settle(&self) -> Duration {
        Duration::from_millis(self.wifi_start_settle_ms)
    }

    pub fn between_sessions(&self) -> Duration {
        Duration::from_millis(self.between_sessions_ms)
    }

    pub fn lease_timeout(&self) -> Duration {
        Duration::from_millis(self.lease_timeout_ms)
    }

    pub fn static_assign_timeout(&self) -> Duration {
        Duration::from_millis(self.static_assign_timeout_ms)
    }

    pub fn existing_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.existing_probe_timeout_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

fn default_mode() -> ExecutionMode {
    ExecutionMode::Sequential
}
fn default_advertising_settle_ms() -> u64 {
    8_000
}
fn default_wifi_start_settle_ms() -> u64 {
    5_000
}
fn default_between_sessions_ms() -> u64 {
    3_000
}
fn default_lease_timeout_ms() -> u64 {
    15_000
}
fn default_static_assign_timeout_ms() -> u64 {
    5_000
}
fn default_status_path() -> String {
    "/gp/gpControl/status".to_string()
}
fn default_existing_probe_timeout_ms() -> u64 {
    2_000
}

/// External BLE tool that sends the "wifi on" command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BleSettings {
    /// Program and leading arguments; `--address <mac> --command <cmd>` is appended
    #[serde(default = "default_tool_command")]
    pub tool_command: Vec<String>,
    #[serde(default = "default_wifi_on_command")]
    pub wifi_on_command: String,
    /// Upper bound for one tool run; the activation policy usually cuts it shorter
    #[serde(default = "default_tool_timeout_ms")]
    pub tool_timeout_ms: u64,
    #[serde(default = "default_adapter")]
    pub adapter: String,
    #[serde(default = "default_radio_settle_ms")]
    pub radio_settle_ms: u64,
    #[serde(default = "default_command_timeout_ms")]
    pub radio_command_timeout_ms: u64,
}

impl Default for BleSettings {
    fn default() -> Self {
        Self {
            tool_command: default_tool_command(),
            wifi_on_command: default_wifi_on_command(),
            tool_timeout_ms: default_tool_timeout_ms(),
            adapter: default_adapter(),
            radio_settle_ms: default_radio_settle_ms(),
            radio_command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

fn default_tool_command() -> Vec<String> {
    vec![
        "python3".to_string(),
        "main.py".to_string(),
        "--interactive".to_string(),
        "true".to_string(),
    ]
}
fn default_wifi_on_command() -> String {
    "wifi on".to_string()
}
fn default_tool_timeout_ms() -> u64 {
    60_000
}
fn default_adapter() -> String {
    "hci0".to_string()
}
fn default_radio_settle_ms() -> u64 {
    3_000
}
fn default_command_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialFileSettings {
    #[serde(default = "default_ctrl_interface")]
    pub ctrl_interface: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for CredentialFileSettings {
    fn default() -> Self {
        Self {
            ctrl_interface: default_ctrl_interface(),
            country: default_country(),
        }
    }
}

fn default_ctrl_interface() -> String {
    "DIR=/var/run/wpa_supplicant GROUP=netdev".to_string()
}
fn default_country() -> String {
    "DE".to_string()
}

/// How the Linux network adapter drives the OS tools
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSettings {
    /// Prefix privileged commands with sudo
    #[serde(default = "default_false")]
    pub use_sudo: bool,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    #[serde(default = "default_link_down_settle_ms")]
    pub link_down_settle_ms: u64,
    #[serde(default = "default_link_up_settle_ms")]
    pub link_up_settle_ms: u64,
    #[serde(default = "default_supplicant_run_dir")]
    pub supplicant_run_dir: String,
    #[serde(default = "default_association_poll_ms")]
    pub association_poll_ms: u64,
    #[serde(default)]
    pub credential_file: CredentialFileSettings,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            use_sudo: default_false(),
            command_timeout_ms: default_command_timeout_ms(),
            link_down_settle_ms: default_link_down_settle_ms(),
            link_up_settle_ms: default_link_up_settle_ms(),
            supplicant_run_dir: default_supplicant_run_dir(),
            association_poll_ms: default_association_poll_ms(),
            credential_file: CredentialFileSettings::default(),
        }
    }
}

fn default_link_down_settle_ms() -> u64 {
    2_000
}
fn default_link_up_settle_ms() -> u64 {
    3_000
}
fn default_supplicant_run_dir() -> String {
    "/var/run/wpa_supplicant".to_string()
}
fn default_association_poll_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,

    #[serde(default)]
    pub connection: ConnectionSettings,

    #[serde(default)]
    pub ble: BleSettings,

    #[serde(default)]
    pub network: NetworkSettings,

    // Logging Settings
    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            connection: ConnectionSettings::default(),
            ble: BleSettings::default(),
            network: NetworkSettings::default(),
            log_settings: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Template written by `init-config`
    pub fn template() -> Self {
        Self {
            devices: vec![DeviceSpec {
                id: "gopro1".to_string(),
                name: "GoPro1".to_string(),
                ble_address: "C8:52:0D:A5:9A:39".to_string(),
                ssid: "HERO8 GoPro1".to_string(),
                psk: "change-me".to_string(),
                device_address: Ipv4Addr::new(10, 5, 5, 9),
                interface: "wlan0".to_string(),
                config_path: None,
                static_address: None,
            }],
            ..Default::default()
        }
    }
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    /// Load settings from `path`, or from the per-user config directory
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let settings_path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        let settings = Self::load_from_file(&settings_path)?;
        validate_devices(&settings.devices)?;

        Ok(Self {
            settings,
            settings_path,
        })
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or_else(|| ConfigError::Settings {
            path: "<config dir>".to_string(),
            reason: "could not determine config directory".to_string(),
        })?;
        path.push("gopro-connect");
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
        let settings_error = |reason: String| ConfigError::Settings {
            path: path.display().to_string(),
            reason,
        };
        let contents = fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| settings_error(e.to_string()))
    }

    /// Write the template unless a file already exists and `force` is unset
    pub fn write_template(path: &Path, force: bool) -> anyhow::Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&Settings::template())?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    /// Resolve command-line ids to devices, in configured order for `all`
    /// and in the given order otherwise
    pub fn select_devices(
        &self,
        ids: &[String],
        all: bool,
    ) -> Result<Vec<Arc<DeviceSpec>>, ConfigError> {
        let devices = &self.settings.devices;
        if devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        if all || ids.is_empty() {
            return Ok(devices.iter().cloned().map(Arc::new).collect());
        }

        ids.iter()
            .map(|id| {
                devices
                    .iter()
                    .find(|d| &d.id == id)
                    .cloned()
                    .map(Arc::new)
                    .ok_or_else(|| ConfigError::UnknownDevice(id.clone()))
            })
            .collect()
    }
}

/// Field-level checks that do not touch the system
pub fn validate_devices(devices: &[DeviceSpec]) -> Result<(), ConfigError> {
    let mut ids = HashSet::new();
    for device in devices {
        let invalid = |reason: &str| ConfigError::InvalidDevice {
            device: device.id.clone(),
            reason: reason.to_string(),
        };

        if device.id.is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if !ids.insert(device.id.as_str()) {
            return Err(invalid("duplicate device id"));
        }
        if device.ssid.is_empty() {
            return Err(invalid("ssid must not be empty"));
        }
        if device.interface.is_empty() {
            return Err(invalid("interface must not be empty"));
        }
        if !is_hardware_address(&device.ble_address) {
            return Err(invalid("ble_address must look like AA:BB:CC:DD:EE:FF"));
        }
    }
    Ok(())
}

pub fn is_hardware_address(address: &str) -> bool {
    let parts: Vec<&str> = address.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}
