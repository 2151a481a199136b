use crate::domain::transport::TransportError;
use thiserror::Error;

/// Problems that abort the whole run before any session starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no devices configured")]
    NoDevices,

    #[error("unknown device id '{0}'")]
    UnknownDevice(String),

    #[error("interface {interface} for {device} does not exist")]
    MissingInterface { device: String, interface: String },

    #[error("interface {interface} for {device} is not a wireless interface")]
    NotWireless { device: String, interface: String },

    #[error("interface {interface} is assigned to both {first} and {second}; concurrent sessions need exclusive interfaces")]
    SharedInterface {
        interface: String,
        first: String,
        second: String,
    },

    #[error("device {device}: {reason}")]
    InvalidDevice { device: String, reason: String },

    #[error("could not inspect interface {interface}: {source}")]
    Inspect {
        interface: String,
        #[source]
        source: TransportError,
    },

    #[error("settings file {path}: {reason}")]
    Settings { path: String, reason: String },
}

/// How a stage function failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageFailure {
    /// Worth another attempt
    Recoverable(String),
    /// No attempt can succeed
    Fatal(String),
}

impl StageFailure {
    pub fn detail(&self) -> &str {
        match self {
            Self::Recoverable(detail) | Self::Fatal(detail) => detail,
        }
    }
}

impl From<TransportError> for StageFailure {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::InvalidInput(_) => Self::Fatal(error.to_string()),
            _ => Self::Recoverable(error.to_string()),
        }
    }
}
