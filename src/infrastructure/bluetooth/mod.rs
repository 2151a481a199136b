//! Bluetooth Module
//!
//! Camera Wi-Fi activation goes through an external BLE tool; the local
//! adapter is power-cycled with `hciconfig` between failed attempts.
//!
//! ```text
//! activate_wifi(mac) ──► <tool_command> --address <mac> --command "wifi on"
//! reset_radio()      ──► hciconfig <adapter> down ; hciconfig <adapter> up
//! ```
//!
//! There is one radio per host. Sessions take the shared
//! [`RadioLock`](crate::domain::transport::RadioLock) for the whole
//! activation stage, so the adapter itself does no locking.

mod activator;

pub use activator::BleToolActivator;
