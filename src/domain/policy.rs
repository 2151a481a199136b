use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy for one pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Added to the attempt timeout for every attempt after the first
    #[serde(default)]
    pub timeout_step_ms: u64,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            timeout_step_ms: 0,
            retry_delay_ms: default_retry_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn single(attempt_timeout_ms: u64) -> Self {
        Self {
            max_attempts: 1,
            attempt_timeout_ms,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Timeout for the given 1-based attempt
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        let extra = self
            .timeout_step_ms
            .saturating_mul(u64::from(attempt.saturating_sub(1)));
        Duration::from_millis(self.attempt_timeout_ms.saturating_add(extra))
    }

    /// Delay after the given 1-based failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let factor = self.backoff_factor.max(1.0).powi(exponent);
        let delay_ms = (self.retry_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(delay_ms.max(0.0) as u64)
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_attempt_timeout_ms() -> u64 {
    30_000
}
fn default_retry_delay_ms() -> u64 {
    2_000
}
fn default_backoff_factor() -> f64 {
    1.0
}
fn default_max_delay_ms() -> u64 {
    15_000
}

/// Per-stage policies for a device session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagePolicies {
    #[serde(default = "default_activate_wifi")]
    pub activate_wifi: RetryPolicy,
    #[serde(default = "default_prepare_interface")]
    pub prepare_interface: RetryPolicy,
    #[serde(default = "default_associate")]
    pub associate: RetryPolicy,
    #[serde(default = "default_install_route")]
    pub install_route: RetryPolicy,
    #[serde(default = "default_verify_reachable")]
    pub verify_reachable: RetryPolicy,
}

impl Default for StagePolicies {
    fn default() -> Self {
        Self {
            activate_wifi: default_activate_wifi(),
            prepare_interface: default_prepare_interface(),
            associate: default_associate(),
            install_route: default_install_route(),
            verify_reachable: default_verify_reachable(),
        }
    }
}

fn default_activate_wifi() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        attempt_timeout_ms: 30_000,
        retry_delay_ms: 5_000,
        ..Default::default()
    }
}
fn default_prepare_interface() -> RetryPolicy {
    RetryPolicy::single(20_000)
}
fn default_associate() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        attempt_timeout_ms: 20_000,
        retry_delay_ms: 2_000,
        ..Default::default()
    }
}
fn default_install_route() -> RetryPolicy {
    RetryPolicy::single(5_000)
}
fn default_verify_reachable() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        attempt_timeout_ms: 10_000,
        retry_delay_ms: 3_000,
        ..Default::default()
    }
}
