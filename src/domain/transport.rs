//! Transport contracts
//!
//! The engine only talks to the radio, the network stack and the camera's
//! HTTP API through these traits. Linux implementations live in
//! `crate::infrastructure`.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceStatus {
    Missing,
    NotWireless,
    Ready,
}

/// Network the camera's access point broadcasts
#[derive(Debug, Clone, Copy)]
pub struct WifiNetwork<'a> {
    pub ssid: &'a str,
    pub psk: &'a str,
}

#[async_trait]
pub trait BleTransport: Send + Sync {
    /// Send the "wifi on" command to the camera at `address`
    async fn activate_wifi(&self, address: &str) -> TransportResult<()>;

    /// Power-cycle the local BLE adapter
    async fn reset_radio(&self) -> TransportResult<()>;
}

#[async_trait]
pub trait NetworkTransport: Send + Sync {
    async fn interface_status(&self, interface: &str) -> TransportResult<InterfaceStatus>;

    /// Bring the interface down and up again with no address, association
    /// or bound process left over
    async fn reset_interface(&self, interface: &str) -> TransportResult<()>;

    /// Join `network`, recording it in `config_path` unless already listed
    async fn associate(
        &self,
        interface: &str,
        network: WifiNetwork<'_>,
        config_path: &Path,
    ) -> TransportResult<()>;

    async fn acquire_lease(&self, interface: &str, timeout: Duration)
        -> TransportResult<Ipv4Addr>;

    async fn assign_static(
        &self,
        interface: &str,
        address: Ipv4Addr,
        prefix_len: u8,
    ) -> TransportResult<()>;

    /// Make traffic to `destination` leave through `interface`
    async fn install_route(&self, interface: &str, destination: Ipv4Addr) -> TransportResult<()>;
}

#[async_trait]
pub trait HttpProber: Send + Sync {
    /// GET `url` through `interface`, returning the status code
    async fn probe(&self, interface: &str, url: &str, timeout: Duration) -> TransportResult<u16>;
}

/// Exclusive use of the host's BLE adapter, held for a whole activation
/// stage including its retries and adapter resets
pub type RadioLock = Arc<Mutex<()>>;

/// The full set of adapters a session needs
#[derive(Clone)]
pub struct Transports {
    pub ble: Arc<dyn BleTransport>,
    pub network: Arc<dyn NetworkTransport>,
    pub http: Arc<dyn HttpProber>,
    pub radio: RadioLock,
}
