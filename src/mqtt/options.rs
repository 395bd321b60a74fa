use std::time::Duration;

use rumqttc::{LastWill, MqttOptions, QoS};
use tracing::debug;

use crate::config::{ConnectionConfig, MqttCredentials};

/// Payload announcing the node on its state topic
pub const ONLINE_PAYLOAD: &str = "online";
/// Retained last will published by the broker when the node disappears
pub const OFFLINE_PAYLOAD: &str = "offline";
/// Keep-alive negotiated with the broker
pub const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Client options for the node described by `config`.
pub fn client_options(config: &ConnectionConfig) -> MqttOptions {
    let broker = config.broker();
    let mut mqtt_options = MqttOptions::new(
        config.client_id(),
        broker.host().to_string(),
        broker.port(),
    );
    mqtt_options
        .set_keep_alive(KEEP_ALIVE)
        .set_last_will(LastWill::new(
            config.topic_state().as_str(),
            OFFLINE_PAYLOAD,
            QoS::AtLeastOnce,
            true,
        ));

    if let MqttCredentials::Password { user, password } = config.credentials() {
        mqtt_options.set_credentials(user.clone(), password.clone());
    }

    debug!("Built MQTT options for {}", broker_label(config));
    mqtt_options
}

/// `user@host:port`, or `host:port` for anonymous access. Never includes the password.
pub fn broker_label(config: &ConnectionConfig) -> String {
    match config.credentials().user() {
        Some(user) => format!("{}@{}", user, config.broker()),
        None => config.broker().to_string(),
    }
}
