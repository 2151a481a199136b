//! Linux network adapter
//!
//! Drives `ip`, `pkill`, `wpa_supplicant`, `wpa_cli` and `dhclient`. Each
//! interface gets its own supplicant instance and credential file.

pub mod credentials;

use crate::domain::settings::NetworkSettings;
use crate::domain::transport::{
    InterfaceStatus, NetworkTransport, TransportError, TransportResult, WifiNetwork,
};
use crate::infrastructure::command::CommandRunner;
use async_trait::async_trait;
use credentials::EnsureOutcome;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const SYSFS_NET: &str = "/sys/class/net";

pub struct LinuxNetwork {
    settings: NetworkSettings,
    runner: CommandRunner,
    sysfs_root: PathBuf,
}

impl LinuxNetwork {
    pub fn new(settings: NetworkSettings) -> Self {
        let runner = CommandRunner::new(
            settings.use_sudo,
            Duration::from_millis(settings.command_timeout_ms),
        );
        Self {
            settings,
            runner,
            sysfs_root: PathBuf::from(SYSFS_NET),
        }
    }

    #[cfg(test)]
    fn with_sysfs_root(mut self, root: PathBuf) -> Self {
        self.sysfs_root = root;
        self
    }

    #[cfg(test)]
    fn with_script_dir(mut self, dir: PathBuf) -> Self {
        self.runner = self.runner.with_script_dir(dir);
        self
    }

    /// Kill the supplicant bound to `interface` and drop its control socket
    async fn stop_supplicant(&self, interface: &str) -> TransportResult<()> {
        self.kill_matching(&format!("wpa_supplicant.*-i *{}( |$)", interface))
            .await?;

        let control_socket = Path::new(&self.settings.supplicant_run_dir).join(interface);
        let control_socket = control_socket.to_string_lossy();
        self.runner.run("rm", &["-f", control_socket.as_ref()]).await?;
        Ok(())
    }

    /// Kill anything matching `pattern`; no match is not an error
    async fn kill_matching(&self, pattern: &str) -> TransportResult<()> {
        let output = self.runner.output("pkill", &["-9", "-f", pattern]).await?;
        debug!("pkill '{}' exited with {:?}", pattern, output.code);
        Ok(())
    }

    async fn wpa_state(&self, interface: &str) -> TransportResult<Option<String>> {
        let output = self
            .runner
            .output(
                "wpa_cli",
                &[
                    "-p",
                    self.settings.supplicant_run_dir.as_str(),
                    "-i",
                    interface,
                    "status",
                ],
            )
            .await?;
        Ok(parse_wpa_state(&output.stdout).map(str::to_string))
    }
}

#[async_trait]
impl NetworkTransport for LinuxNetwork {
    async fn interface_status(&self, interface: &str) -> TransportResult<InterfaceStatus> {
        let path = self.sysfs_root.join(interface);
        if !path.exists() {
            return Ok(InterfaceStatus::Missing);
        }
        if path.join("wireless").exists() || path.join("phy80211").exists() {
            Ok(InterfaceStatus::Ready)
        } else {
            Ok(InterfaceStatus::NotWireless)
        }
    }

    async fn reset_interface(&self, interface: &str) -> TransportResult<()> {
        info!("Resetting interface {}", interface);

        self.stop_supplicant(interface).await?;
        self.kill_matching(&format!("dhclient.* {}( |$)", interface))
            .await?;

        self.runner
            .run("ip", &["link", "set", interface, "down"])
            .await?;
        self.runner
            .run("ip", &["addr", "flush", "dev", interface])
            .await?;
        tokio::time::sleep(Duration::from_millis(self.settings.link_down_settle_ms)).await;

        self.runner.run("ip", &["link", "set", interface, "up"]).await?;
        tokio::time::sleep(Duration::from_millis(self.settings.link_up_settle_ms)).await;

        Ok(())
    }

    /// Starts a fresh supplicant, then polls `wpa_cli status` until the
    /// caller's attempt timeout cancels it. A supplicant left behind by a
    /// cancelled attempt is replaced.
    async fn associate(
        &self,
        interface: &str,
        network: WifiNetwork<'_>,
        config_path: &Path,
    ) -> TransportResult<()> {
        if network.ssid.contains('"') || network.psk.contains('"') {
            return Err(TransportError::InvalidInput(
                "SSID and passphrase must not contain double quotes".to_string(),
            ));
        }

        let outcome = credentials::ensure_network(
            config_path,
            network.ssid,
            network.psk,
            &self.settings.credential_file,
        )
        .map_err(|e| {
            TransportError::Failed(format!("credential file {}: {:#}", config_path.display(), e))
        })?;
        if outcome != EnsureOutcome::AlreadyPresent {
            info!("Recorded {} in {}", network.ssid, config_path.display());
        }

        self.stop_supplicant(interface).await?;

        let config = config_path.to_string_lossy();
        self.runner
            .run("wpa_supplicant", &["-B", "-i", interface, "-c", config.as_ref()])
            .await?;

        let poll = Duration::from_millis(self.settings.association_poll_ms.max(50));
        loop {
            match self.wpa_state(interface).await? {
                Some(state) if state == "COMPLETED" => {
                    info!("{} associated with {}", interface, network.ssid);
                    return Ok(());
                }
                state => debug!("{} wpa_state {:?}", interface, state),
            }
            tokio::time::sleep(poll).await;
        }
    }

    async fn acquire_lease(
        &self,
        interface: &str,
        timeout: Duration,
    ) -> TransportResult<Ipv4Addr> {
        self.runner
            .run_with_timeout("dhclient", &["-1", interface], timeout)
            .await?;

        let addresses = self
            .runner
            .run("ip", &["-4", "-o", "addr", "show", "dev", interface])
            .await?;
        parse_ipv4_address(&addresses).ok_or_else(|| {
            TransportError::Failed(format!("{} has no IPv4 address after the lease", interface))
        })
    }

    async fn assign_static(
        &self,
        interface: &str,
        address: Ipv4Addr,
        prefix_len: u8,
    ) -> TransportResult<()> {
        let cidr = format!("{}/{}", address, prefix_len);
        self.runner
            .run("ip", &["addr", "replace", cidr.as_str(), "dev", interface])
            .await?;
        Ok(())
    }

    async fn install_route(&self, interface: &str, destination: Ipv4Addr) -> TransportResult<()> {
        let host = format!("{}/32", destination);
        self.runner
            .run("ip", &["route", "replace", host.as_str(), "dev", interface])
            .await?;
        Ok(())
    }
}

/// `wpa_state` value from `wpa_cli status` output
fn parse_wpa_state(status: &str) -> Option<&str> {
    status
        .lines()
        .find_map(|line| line.trim().strip_prefix("wpa_state="))
}

/// First address from `ip -4 -o addr show` output
fn parse_ipv4_address(output: &str) -> Option<Ipv4Addr> {
    output.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        tokens.find(|t| *t == "inet")?;
        tokens.next()?.split('/').next()?.parse().ok()
    })
}
