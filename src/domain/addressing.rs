//! Static fallback addressing
//!
//! Several interfaces can sit on identical camera subnets (every camera
//! serves 10.5.5.9), so the fallback host is derived from the interface name
//! to keep two interfaces from claiming the same address.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressingSettings {
    #[serde(default = "default_prefix_len")]
    pub prefix_len: u8,
    /// First host number handed out; wlan0 gets this host, wlan1 the next
    #[serde(default = "default_host_base")]
    pub static_host_base: u32,
}

impl Default for AddressingSettings {
    fn default() -> Self {
        Self {
            prefix_len: default_prefix_len(),
            static_host_base: default_host_base(),
        }
    }
}

fn default_prefix_len() -> u8 {
    24
}
fn default_host_base() -> u32 {
    100
}

const HASHED_SLOTS: u32 = 64;

/// Fallback address for `interface` on the subnet of `device_address`
pub fn fallback_address(
    interface: &str,
    device_address: Ipv4Addr,
    settings: &AddressingSettings,
) -> Ipv4Addr {
    let prefix_len = u32::from(settings.prefix_len.clamp(1, 30));
    let mask = u32::MAX << (32 - prefix_len);
    let network = u32::from(device_address) & mask;
    let host_count = !mask;

    // Both terms are below host_count < 2^31, so the sum cannot overflow
    let mut host = (settings.static_host_base % host_count
        + interface_slot(interface) % host_count)
        % host_count;
    let device_host = u32::from(device_address) & !mask;

    // Skip the network address, the camera itself and the broadcast address
    while host == 0 || host == device_host || host == host_count {
        host = (host + 1) % host_count;
    }

    Ipv4Addr::from(network | host)
}

fn interface_slot(interface: &str) -> u32 {
    let digits: String = interface
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    match digits.parse::<u32>() {
        Ok(n) => n,
        Err(_) => fnv1a(interface.as_bytes()) % HASHED_SLOTS,
    }
}

// Stable across builds, unlike std's DefaultHasher
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}
