//! Linux adapters behind the domain transport traits

pub mod bluetooth;
pub mod command;
#[cfg(test)]
pub mod fake;
pub mod http;
pub mod logging;
pub mod network;

use crate::domain::settings::Settings;
use crate::domain::transport::{RadioLock, Transports};
use bluetooth::BleToolActivator;
use http::ReqwestProber;
use network::LinuxNetwork;
use std::sync::Arc;

/// Production transports configured from the settings file
pub fn system_transports(settings: &Settings) -> Transports {
    Transports {
        ble: Arc::new(BleToolActivator::new(
            settings.ble.clone(),
            settings.network.use_sudo,
        )),
        network: Arc::new(LinuxNetwork::new(settings.network.clone())),
        http: Arc::new(ReqwestProber::new()),
        radio: RadioLock::default(),
    }
}
