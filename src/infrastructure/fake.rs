//! Scriptable in-memory transports for tests
//!
//! Behavior is configured per interface. Every call is counted so tests can
//! assert which operations ran and how often.

use crate::domain::models::DeviceSpec;
use crate::domain::transport::{
    BleTransport, HttpProber, InterfaceStatus, NetworkTransport, RadioLock, TransportError,
    TransportResult, Transports, WifiNetwork,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const RADIO: &str = "radio";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeLease {
    Granted(Ipv4Addr),
    /// Hangs for the full lease timeout, then reports a timeout
    TimesOut,
    Fails,
}

#[derive(Debug, Clone)]
pub struct FakeBehavior {
    pub interface_status: InterfaceStatus,
    /// Number of leading activation calls that fail; `u32::MAX` for always
    pub activate_failures: u32,
    pub activate_invalid: bool,
    /// How long one activation keeps the radio busy
    pub activate_delay: Duration,
    pub reset_fails: bool,
    pub associate_failures: u32,
    pub lease: FakeLease,
    pub assign_fails: bool,
    pub route_fails: bool,
    /// Status codes returned in order, the last one repeating; empty means 200.
    /// A code of 0 is reported as a connection error.
    pub probe_statuses: Vec<u16>,
    pub probe_panics: bool,
}

impl Default for FakeBehavior {
    fn default() -> Self {
        Self {
            interface_status: InterfaceStatus::Ready,
            activate_failures: 0,
            activate_invalid: false,
            activate_delay: Duration::ZERO,
            reset_fails: false,
            associate_failures: 0,
            lease: FakeLease::Granted(Ipv4Addr::new(10, 5, 5, 50)),
            assign_fails: false,
            route_fails: false,
            probe_statuses: Vec::new(),
            probe_panics: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    InterfaceStatus,
    ActivateWifi,
    ResetRadio,
    ResetInterface,
    Associate,
    AcquireLease,
    AssignStatic,
    InstallRoute,
    Probe,
}

#[derive(Default)]
struct FakeState {
    behaviors: HashMap<String, FakeBehavior>,
    /// BLE address -> interface
    radios: HashMap<String, String>,
    counts: HashMap<(Op, String), u32>,
    probe_timeouts: HashMap<String, Vec<Duration>>,
}

/// Like the real adapter, the fake radio serves one caller at a time;
/// overlapping use is reported as a failure
#[derive(Default)]
pub struct FakeTransport {
    state: Mutex<FakeState>,
    radio_busy: AtomicBool,
}

struct RadioUse<'a>(&'a AtomicBool);

impl<'a> RadioUse<'a> {
    fn claim(busy: &'a AtomicBool) -> TransportResult<Self> {
        if busy.swap(true, Ordering::SeqCst) {
            return Err(TransportError::Failed("radio busy".to_string()));
        }
        Ok(Self(busy))
    }
}

impl Drop for RadioUse<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, device: &DeviceSpec, behavior: FakeBehavior) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .radios
                .insert(device.ble_address.clone(), device.interface.clone());
            state.behaviors.insert(device.interface.clone(), behavior);
        }
        self
    }

    pub fn transports(self: Arc<Self>) -> Transports {
        Transports {
            ble: self.clone(),
            network: self.clone(),
            http: self,
            radio: RadioLock::default(),
        }
    }

    /// How often `op` ran against `interface` (or [`RADIO`] for resets)
    pub fn calls(&self, op: Op, interface: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state
            .counts
            .get(&(op, interface.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total calls of `op` across interfaces
    pub fn total_calls(&self, op: Op) -> u32 {
        let state = self.state.lock().unwrap();
        state
            .counts
            .iter()
            .filter(|((o, _), _)| *o == op)
            .map(|(_, n)| n)
            .sum()
    }

    /// Count the call and return the behavior plus the 1-based call number
    fn record(&self, op: Op, interface: &str) -> (Option<FakeBehavior>, u32) {
        let mut state = self.state.lock().unwrap();
        let count = state.counts.entry((op, interface.to_string())).or_insert(0);
        *count += 1;
        let call = *count;
        (state.behaviors.get(interface).cloned(), call)
    }

    /// Timeouts the prober was handed for `interface`, in call order
    pub fn probe_timeouts(&self, interface: &str) -> Vec<Duration> {
        let state = self.state.lock().unwrap();
        state
            .probe_timeouts
            .get(interface)
            .cloned()
            .unwrap_or_default()
    }

    fn interface_for(&self, address: &str) -> Option<String> {
        self.state.lock().unwrap().radios.get(address).cloned()
    }
}

fn unknown(interface: &str) -> TransportError {
    TransportError::Failed(format!("unknown interface {}", interface))
}

#[async_trait]
impl BleTransport for FakeTransport {
    async fn activate_wifi(&self, address: &str) -> TransportResult<()> {
        let interface = self
            .interface_for(address)
            .unwrap_or_else(|| address.to_string());
        let (behavior, call) = self.record(Op::ActivateWifi, &interface);
        let behavior = behavior.ok_or_else(|| unknown(&interface))?;

        if behavior.activate_invalid {
            return Err(TransportError::InvalidInput(format!("bad address {}", address)));
        }

        let _radio = RadioUse::claim(&self.radio_busy)?;
        tokio::time::sleep(behavior.activate_delay).await;
        if call <= behavior.activate_failures {
            return Err(TransportError::Failed("device not advertising".to_string()));
        }
        Ok(())
    }

    async fn reset_radio(&self) -> TransportResult<()> {
        self.record(Op::ResetRadio, RADIO);
        let _radio = RadioUse::claim(&self.radio_busy)?;
        Ok(())
    }
}

#[async_trait]
impl NetworkTransport for FakeTransport {
    async fn interface_status(&self, interface: &str) -> TransportResult<InterfaceStatus> {
        let (behavior, _) = self.record(Op::InterfaceStatus, interface);
        Ok(behavior
            .map(|b| b.interface_status)
            .unwrap_or(InterfaceStatus::Missing))
    }

    async fn reset_interface(&self, interface: &str) -> TransportResult<()> {
        let (behavior, _) = self.record(Op::ResetInterface, interface);
        match behavior {
            Some(b) if !b.reset_fails => Ok(()),
            Some(_) => Err(TransportError::Failed("ip link set up failed".to_string())),
            None => Err(unknown(interface)),
        }
    }

    async fn associate(
        &self,
        interface: &str,
        _network: WifiNetwork<'_>,
        _config_path: &Path,
    ) -> TransportResult<()> {
        let (behavior, call) = self.record(Op::Associate, interface);
        let behavior = behavior.ok_or_else(|| unknown(interface))?;
        if call <= behavior.associate_failures {
            return Err(TransportError::Failed("association not completed".to_string()));
        }
        Ok(())
    }

    async fn acquire_lease(
        &self,
        interface: &str,
        timeout: Duration,
    ) -> TransportResult<Ipv4Addr> {
        let (behavior, _) = self.record(Op::AcquireLease, interface);
        match behavior.ok_or_else(|| unknown(interface))?.lease {
            FakeLease::Granted(address) => Ok(address),
            FakeLease::TimesOut => {
                tokio::time::sleep(timeout).await;
                Err(TransportError::TimedOut(timeout))
            }
            FakeLease::Fails => Err(TransportError::Failed("no DHCPOFFERS received".to_string())),
        }
    }

    async fn assign_static(
        &self,
        interface: &str,
        _address: Ipv4Addr,
        _prefix_len: u8,
    ) -> TransportResult<()> {
        let (behavior, _) = self.record(Op::AssignStatic, interface);
        match behavior {
            Some(b) if !b.assign_fails => Ok(()),
            Some(_) => Err(TransportError::Failed("RTNETLINK answers: File exists".to_string())),
            None => Err(unknown(interface)),
        }
    }

    async fn install_route(&self, interface: &str, _destination: Ipv4Addr) -> TransportResult<()> {
        let (behavior, _) = self.record(Op::InstallRoute, interface);
        match behavior {
            Some(b) if !b.route_fails => Ok(()),
            Some(_) => Err(TransportError::Failed("Nexthop has invalid gateway".to_string())),
            None => Err(unknown(interface)),
        }
    }
}

#[async_trait]
impl HttpProber for FakeTransport {
    async fn probe(&self, interface: &str, _url: &str, timeout: Duration) -> TransportResult<u16> {
        let (behavior, call) = self.record(Op::Probe, interface);
        self.state
            .lock()
            .unwrap()
            .probe_timeouts
            .entry(interface.to_string())
            .or_default()
            .push(timeout);
        let behavior = behavior.ok_or_else(|| unknown(interface))?;
        if behavior.probe_panics {
            panic!("prober crashed on {}", interface);
        }
        let index = (call as usize - 1).min(behavior.probe_statuses.len().saturating_sub(1));
        match behavior.probe_statuses.get(index).copied().unwrap_or(200) {
            0 => Err(TransportError::Failed("connection refused".to_string())),
            code => Ok(code),
        }
    }
}

/// Device on the usual camera subnet, bound to `interface`
pub fn test_device(id: &str, interface: &str) -> DeviceSpec {
    let tag = id
        .bytes()
        .chain(interface.bytes())
        .fold(17u16, |hash, b| hash.wrapping_mul(31).wrapping_add(u16::from(b)));
    DeviceSpec {
        id: id.to_string(),
        name: id.to_uppercase(),
        ble_address: format!("D0:21:F8:9C:{:02X}:{:02X}", tag >> 8, tag & 0xff),
        ssid: format!("HERO8 {}", id),
        psk: "secret".to_string(),
        device_address: Ipv4Addr::new(10, 5, 5, 9),
        interface: interface.to_string(),
        config_path: None,
        static_address: None,
    }
}
