//! wpa_supplicant credential files
//!
//! One file per interface. Network blocks are matched by exact SSID and are
//! never written twice.

use crate::domain::settings::CredentialFileSettings;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEntry {
    pub ssid: String,
    pub psk: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    Appended,
    AlreadyPresent,
}

/// Make sure `path` lists `ssid`, creating the file with a header if needed
pub fn ensure_network(
    path: &Path,
    ssid: &str,
    psk: &str,
    settings: &CredentialFileSettings,
) -> anyhow::Result<EnsureOutcome> {
    if ssid.contains('"') || psk.contains('"') {
        anyhow::bail!("SSID and passphrase must not contain double quotes");
    }

    let created = if path.exists() {
        false
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("Creating {}", path.display());
        fs::write(path, header(settings))?;
        true
    };

    let contents = fs::read_to_string(path)?;
    if parse_networks(&contents).iter().any(|n| n.ssid == ssid) {
        debug!("{} already lists {}", path.display(), ssid);
        return Ok(if created {
            EnsureOutcome::Created
        } else {
            EnsureOutcome::AlreadyPresent
        });
    }

    info!("Adding {} to {}", ssid, path.display());
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(network_block(ssid, psk).as_bytes())?;

    Ok(if created {
        EnsureOutcome::Created
    } else {
        EnsureOutcome::Appended
    })
}

/// Network blocks in file order
pub fn parse_networks(contents: &str) -> Vec<NetworkEntry> {
    let mut networks = Vec::new();
    let mut current: Option<NetworkEntry> = None;

    for line in contents.lines().map(str::trim) {
        if line.starts_with("network=") && line.ends_with('{') {
            current = Some(NetworkEntry {
                ssid: String::new(),
                psk: None,
            });
        } else if line == "}" {
            if let Some(entry) = current.take() {
                networks.push(entry);
            }
        } else if let Some(entry) = current.as_mut() {
            if let Some(value) = line.strip_prefix("ssid=") {
                entry.ssid = unquote(value).to_string();
            } else if let Some(value) = line.strip_prefix("psk=") {
                entry.psk = Some(unquote(value).to_string());
            }
        }
    }

    networks
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn header(settings: &CredentialFileSettings) -> String {
    format!(
        "ctrl_interface={}\nupdate_config=1\ncountry={}\n",
        settings.ctrl_interface, settings.country
    )
}

fn network_block(ssid: &str, psk: &str) -> String {
    format!(
        "\nnetwork={{\n    ssid=\"{}\"\n    psk=\"{}\"\n    key_mgmt=WPA-PSK\n}}\n",
        ssid, psk
    )
}
