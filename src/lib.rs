//! Connection configuration core for an MQTT temperature sensor node.
//!
//! Raw parameters from any provisioning source are validated once at startup
//! into an immutable [`config::ConnectionConfig`] that the Wi-Fi connector,
//! the MQTT client and the publisher task read from.

pub mod config;
pub mod mqtt;
pub mod persistence;

pub use config::{ConfigError, ConfigErrors, ConfigStore, ConnectionConfig, RawConfig, ValidationPolicy};
