//! The validated configuration handed to the firmware's collaborators.
//!
//! Everything here is immutable once built. The only constructor is the
//! validator in [`super::validate`], so holding a [`ConnectionConfig`] proves
//! every field passed its checks.

use std::fmt;
use std::time::Duration;

use super::address::BrokerAddress;
use super::topic::TopicName;

/// How the Wi-Fi connector authenticates against the access point.
#[derive(Clone, PartialEq, Eq)]
pub enum WifiAuth {
    /// Open network, no passphrase
    Open,
    /// WPA2 personal with a pre-shared passphrase
    Wpa2 { passphrase: String },
}

impl WifiAuth {
    pub fn passphrase(&self) -> Option<&str> {
        match self {
            WifiAuth::Open => None,
            WifiAuth::Wpa2 { passphrase } => Some(passphrase),
        }
    }
}

impl fmt::Debug for WifiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WifiAuth::Open => f.write_str("Open"),
            WifiAuth::Wpa2 { .. } => f.write_str("Wpa2 { passphrase: <redacted> }"),
        }
    }
}

/// Broker login. `Anonymous` is the "no authentication" case.
#[derive(Clone, PartialEq, Eq)]
pub enum MqttCredentials {
    Anonymous,
    Password { user: String, password: String },
}

impl MqttCredentials {
    pub fn user(&self) -> Option<&str> {
        match self {
            MqttCredentials::Anonymous => None,
            MqttCredentials::Password { user, .. } => Some(user),
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            MqttCredentials::Anonymous => None,
            MqttCredentials::Password { password, .. } => Some(password),
        }
    }
}

impl fmt::Debug for MqttCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MqttCredentials::Anonymous => f.write_str("Anonymous"),
            MqttCredentials::Password { user, .. } => f
                .debug_struct("Password")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// What the Wi-Fi connector needs
#[derive(Debug, Clone, Copy)]
pub struct WifiSettings<'a> {
    pub ssid: &'a str,
    pub auth: &'a WifiAuth,
}

/// What the publisher task needs
#[derive(Debug, Clone, Copy)]
pub struct PublishSettings<'a> {
    pub topic_temperature: &'a TopicName,
    pub topic_state: &'a TopicName,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub(super) wifi_ssid: String,
    pub(super) wifi_auth: WifiAuth,
    pub(super) broker: BrokerAddress,
    pub(super) credentials: MqttCredentials,
    pub(super) topic_temperature: TopicName,
    pub(super) topic_state: TopicName,
    pub(super) publish_delay_ms: u32,
    pub(super) client_id: String,
}

impl ConnectionConfig {
    pub fn wifi_ssid(&self) -> &str {
        &self.wifi_ssid
    }

    pub fn wifi_auth(&self) -> &WifiAuth {
        &self.wifi_auth
    }

    pub fn wifi(&self) -> WifiSettings<'_> {
        WifiSettings {
            ssid: &self.wifi_ssid,
            auth: &self.wifi_auth,
        }
    }

    pub fn broker(&self) -> &BrokerAddress {
        &self.broker
    }

    pub fn credentials(&self) -> &MqttCredentials {
        &self.credentials
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn topic_temperature(&self) -> &TopicName {
        &self.topic_temperature
    }

    pub fn topic_state(&self) -> &TopicName {
        &self.topic_state
    }

    pub fn publish_delay_ms(&self) -> u32 {
        self.publish_delay_ms
    }

    pub fn publish_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.publish_delay_ms))
    }

    pub fn publish(&self) -> PublishSettings<'_> {
        PublishSettings {
            topic_temperature: &self.topic_temperature,
            topic_state: &self.topic_state,
            delay: self.publish_delay(),
        }
    }
}
