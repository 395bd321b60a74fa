use serde::{Deserialize, Serialize};
use std::fmt;

/// Unvalidated connection parameters as they come out of a provisioning source.
///
/// `None` means the source did not provide the field. Field names double as
/// provisioning-file keys and, upper-cased with a `TEMPNODE_` prefix, as
/// environment variable names.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub mqtt_server: Option<String>,
    pub mqtt_port: Option<u16>,
    pub mqtt_user: Option<String>,
    pub mqtt_password: Option<String>,
    /// `true` drops any credentials provided by lower layers
    pub mqtt_anonymous: Option<bool>,
    pub mqtt_topic_temperature: Option<String>,
    pub mqtt_topic_state: Option<String>,
    pub mqtt_publish_delay_ms: Option<u64>,
    pub mqtt_client_id: Option<String>,
}

impl RawConfig {
    /// Layers `upper` on top of `self`: every field `upper` provides wins.
    ///
    /// Credentials are layered as a pair: an upper layer with
    /// `mqtt_anonymous = true` clears the lower user and password, and an upper
    /// layer naming a user or password replaces a lower anonymous flag.
    pub fn overlay(self, upper: RawConfig) -> RawConfig {
        let (mqtt_anonymous, mqtt_user, mqtt_password) = if upper.mqtt_anonymous == Some(true) {
            (Some(true), upper.mqtt_user, upper.mqtt_password)
        } else if upper.mqtt_user.is_some() || upper.mqtt_password.is_some() {
            (
                upper.mqtt_anonymous,
                upper.mqtt_user.or(self.mqtt_user),
                upper.mqtt_password.or(self.mqtt_password),
            )
        } else {
            (
                upper.mqtt_anonymous.or(self.mqtt_anonymous),
                self.mqtt_user,
                self.mqtt_password,
            )
        };

        RawConfig {
            wifi_ssid: upper.wifi_ssid.or(self.wifi_ssid),
            wifi_password: upper.wifi_password.or(self.wifi_password),
            mqtt_server: upper.mqtt_server.or(self.mqtt_server),
            mqtt_port: upper.mqtt_port.or(self.mqtt_port),
            mqtt_user,
            mqtt_password,
            mqtt_anonymous,
            mqtt_topic_temperature: upper.mqtt_topic_temperature.or(self.mqtt_topic_temperature),
            mqtt_topic_state: upper.mqtt_topic_state.or(self.mqtt_topic_state),
            mqtt_publish_delay_ms: upper.mqtt_publish_delay_ms.or(self.mqtt_publish_delay_ms),
            mqtt_client_id: upper.mqtt_client_id.or(self.mqtt_client_id),
        }
    }

    /// True when no field is provided
    pub fn is_empty(&self) -> bool {
        *self == RawConfig::default()
    }
}

// Passwords are never printed, only whether one was provided.
impl fmt::Debug for RawConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

        f.debug_struct("RawConfig")
            .field("wifi_ssid", &self.wifi_ssid)
            .field("wifi_password", &redacted(&self.wifi_password))
            .field("mqtt_server", &self.mqtt_server)
            .field("mqtt_port", &self.mqtt_port)
            .field("mqtt_user", &self.mqtt_user)
            .field("mqtt_password", &redacted(&self.mqtt_password))
            .field("mqtt_anonymous", &self.mqtt_anonymous)
            .field("mqtt_topic_temperature", &self.mqtt_topic_temperature)
            .field("mqtt_topic_state", &self.mqtt_topic_state)
            .field("mqtt_publish_delay_ms", &self.mqtt_publish_delay_ms)
            .field("mqtt_client_id", &self.mqtt_client_id)
            .finish()
    }
}
