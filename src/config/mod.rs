//! # Configuration Module
//!
//! ## Why This Module Exists
//! The sensor firmware needs Wi-Fi credentials, a broker address with optional
//! login, two topics, a publish interval and a client id. Historically these were
//! process-wide constants that were only discovered to be wrong when a network
//! operation failed. This module turns raw values into one [`ConnectionConfig`]
//! that is checked completely before any collaborator sees it.
//!
//! ## Key Abstractions
//! - **[`RawConfig`]**: flat, unvalidated fields as delivered by any provisioning
//!   source (see [`crate::persistence`]). The validator does not care where they
//!   came from.
//! - **[`ConnectionConfig`]**: the immutable, validated result. It has no setters
//!   and is shared by reference or through an `Arc`.
//! - **[`ConfigStore`]**: owns the loaded configuration for the lifetime of the
//!   process.
//!
//! ## Lifecycle
//! ```text
//! Unloaded ──load()──► Loaded  (Ok(ConfigStore))
//!     │
//!     └────────────► Failed  (Err(ConfigErrors))
//! ```
//! Both outcomes are terminal. Loading again means building a new store.
//!
//! ## Error Handling Strategy
//! Every violated constraint becomes a [`ConfigError`] naming the raw field.
//! The validator keeps going after the first violation so a single run reports
//! everything that needs fixing. Values are never corrected silently.

pub mod address;
pub mod connection;
pub mod error;
pub mod policy;
pub mod raw;
pub mod topic;
pub mod validate;

use std::sync::Arc;
use tracing::{error, info};

pub use address::{AddressError, BrokerAddress, BrokerHost, DEFAULT_MQTT_PORT};
pub use connection::{ConnectionConfig, MqttCredentials, PublishSettings, WifiAuth, WifiSettings};
pub use error::{ConfigError, ConfigErrors};
pub use policy::ValidationPolicy;
pub use raw::RawConfig;
pub use topic::{TopicError, TopicName};
pub use validate::load;

/// Raw field names, as used in errors, provisioning files and environment variables.
pub mod field {
    pub const WIFI_SSID: &str = "wifi_ssid";
    pub const WIFI_PASSWORD: &str = "wifi_password";
    pub const MQTT_SERVER: &str = "mqtt_server";
    pub const MQTT_PORT: &str = "mqtt_port";
    pub const MQTT_USER: &str = "mqtt_user";
    pub const MQTT_PASSWORD: &str = "mqtt_password";
    pub const MQTT_ANONYMOUS: &str = "mqtt_anonymous";
    pub const MQTT_TOPIC_TEMPERATURE: &str = "mqtt_topic_temperature";
    pub const MQTT_TOPIC_STATE: &str = "mqtt_topic_state";
    pub const MQTT_PUBLISH_DELAY_MS: &str = "mqtt_publish_delay_ms";
    pub const MQTT_CLIENT_ID: &str = "mqtt_client_id";

    /// All fields in declaration order
    pub const ALL: [&str; 11] = [
        WIFI_SSID,
        WIFI_PASSWORD,
        MQTT_SERVER,
        MQTT_PORT,
        MQTT_USER,
        MQTT_PASSWORD,
        MQTT_ANONYMOUS,
        MQTT_TOPIC_TEMPERATURE,
        MQTT_TOPIC_STATE,
        MQTT_PUBLISH_DELAY_MS,
        MQTT_CLIENT_ID,
    ];
}

/// Holds the validated configuration for the lifetime of the firmware.
///
/// A `ConfigStore` only exists in the loaded state; a failed load yields the
/// error list instead. The store is created once by the startup routine and
/// collaborators receive either a reference or an `Arc` from [`ConfigStore::shared`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: Arc<ConnectionConfig>,
}

impl ConfigStore {
    pub fn load(raw: &RawConfig, policy: &ValidationPolicy) -> Result<Self, ConfigErrors> {
        match validate::load(raw, policy) {
            Ok(config) => {
                info!(
                    "Configuration loaded for client {} (broker {}, publishing every {} ms)",
                    config.client_id(),
                    config.broker(),
                    config.publish_delay_ms()
                );
                Ok(Self {
                    config: Arc::new(config),
                })
            }
            Err(errors) => {
                for e in &errors {
                    error!("Configuration error: {}", e);
                }
                Err(errors)
            }
        }
    }

    pub fn get(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Shared handle for collaborators running in their own tasks
    pub fn shared(&self) -> Arc<ConnectionConfig> {
        Arc::clone(&self.config)
    }
}
