pub mod addressing;
pub mod error;
pub mod events;
pub mod executor;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod session;
pub mod settings;
pub mod transport;
