//! Connect GoPro cameras over BLE and Wi-Fi, one dedicated interface per
//! camera.

pub mod domain;
pub mod infrastructure;
pub mod presentation;
