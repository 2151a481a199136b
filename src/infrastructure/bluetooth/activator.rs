use crate::domain::settings::{is_hardware_address, BleSettings};
use crate::domain::transport::{BleTransport, TransportError, TransportResult};
use crate::infrastructure::command::CommandRunner;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct BleToolActivator {
    settings: BleSettings,
    /// Runs the BLE tool itself, never under sudo
    tool: CommandRunner,
    /// Runs hciconfig, which needs privileges
    admin: CommandRunner,
}

impl BleToolActivator {
    pub fn new(settings: BleSettings, use_sudo: bool) -> Self {
        let tool = CommandRunner::new(false, Duration::from_millis(settings.tool_timeout_ms));
        let admin = CommandRunner::new(
            use_sudo,
            Duration::from_millis(settings.radio_command_timeout_ms),
        );
        Self {
            settings,
            tool,
            admin,
        }
    }
}

/// Full argument vector for one activation call
fn tool_invocation(settings: &BleSettings, address: &str) -> TransportResult<Vec<String>> {
    if !is_hardware_address(address) {
        return Err(TransportError::InvalidInput(format!(
            "'{}' is not a BLE hardware address",
            address
        )));
    }
    if settings.tool_command.is_empty() {
        return Err(TransportError::InvalidInput(
            "ble.tool_command is empty".to_string(),
        ));
    }

    let mut args = settings.tool_command.clone();
    args.extend([
        "--address".to_string(),
        address.to_string(),
        "--command".to_string(),
        settings.wifi_on_command.clone(),
    ]);
    Ok(args)
}

#[async_trait]
impl BleTransport for BleToolActivator {
    async fn activate_wifi(&self, address: &str) -> TransportResult<()> {
        let invocation = tool_invocation(&self.settings, address)?;
        let (program, args) = invocation
            .split_first()
            .ok_or_else(|| TransportError::InvalidInput("ble.tool_command is empty".to_string()))?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        debug!("Sending '{}' to {}", self.settings.wifi_on_command, address);
        let output = self.tool.output(program, &args).await?;

        if output.success {
            info!("Camera {} accepted '{}'", address, self.settings.wifi_on_command);
            Ok(())
        } else {
            Err(TransportError::Failed(format!(
                "BLE tool exited with {}: {}",
                output
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                output.diagnostic()
            )))
        }
    }

    async fn reset_radio(&self) -> TransportResult<()> {
        let adapter = self.settings.adapter.as_str();
        warn!("Power-cycling Bluetooth adapter {}", adapter);

        self.admin.run("hciconfig", &[adapter, "down"]).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        self.admin.run("hciconfig", &[adapter, "up"]).await?;
        tokio::time::sleep(Duration::from_millis(self.settings.radio_settle_ms)).await;

        let status = self.admin.run("hciconfig", &[adapter]).await?;
        if status.contains("UP RUNNING") {
            Ok(())
        } else {
            Err(TransportError::Failed(format!(
                "adapter {} did not come back up",
                adapter
            )))
        }
    }
}
