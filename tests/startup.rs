//! Full startup path: provisioning file + environment -> store -> collaborator views.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tempnode::config::{field, ConfigError, ConfigStore, MqttCredentials, WifiAuth};
use tempnode::mqtt::{self, OFFLINE_PAYLOAD};
use tempnode::persistence::{resolve_with, CONFIG_PATH_ENV};

fn lookup_from(pairs: Vec<(&str, String)>) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    move |key| map.get(key).cloned()
}

fn scratch_file(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("tempnode-it-{}-{}", std::process::id(), name));
    path
}

const PROVISIONING: &str = r#"
[connection]
wifi_ssid = "home"
wifi_password = "secret"
mqtt_server = "10.0.0.5"
mqtt_user = "sensor"
mqtt_password = "pw"
mqtt_topic_temperature = "home/s1/temp"
mqtt_topic_state = "home/s1/status"
mqtt_publish_delay_ms = 15000
mqtt_client_id = "s1"
"#;

#[tokio::test]
async fn provisioned_node_starts_up() {
    let path = scratch_file("node.toml");
    tokio::fs::write(&path, PROVISIONING).await.unwrap();

    let provisioning = resolve_with(lookup_from(vec![(
        CONFIG_PATH_ENV,
        path.to_string_lossy().to_string(),
    )]))
    .await
    .unwrap();
    tokio::fs::remove_file(&path).await.ok();

    let store = ConfigStore::load(&provisioning.raw, &provisioning.policy).unwrap();
    let config = store.get();

    assert_eq!(config.wifi().ssid, "home");
    assert_eq!(
        config.wifi().auth,
        &WifiAuth::Wpa2 {
            passphrase: "secret".into()
        }
    );
    assert_eq!(
        config.credentials(),
        &MqttCredentials::Password {
            user: "sensor".into(),
            password: "pw".into()
        }
    );
    assert_eq!(config.publish_delay_ms(), 15_000);

    let options = mqtt::client_options(config);
    assert_eq!(options.broker_address(), ("10.0.0.5".to_string(), 1883));
    let will = options.last_will().unwrap();
    assert_eq!(will.topic, "home/s1/status");
    assert_eq!(&will.message[..], OFFLINE_PAYLOAD.as_bytes());
}

#[tokio::test]
async fn environment_override_can_break_the_config() {
    let path = scratch_file("override.toml");
    tokio::fs::write(&path, PROVISIONING).await.unwrap();

    let provisioning = resolve_with(lookup_from(vec![
        (CONFIG_PATH_ENV, path.to_string_lossy().to_string()),
        ("TEMPNODE_MQTT_TOPIC_TEMPERATURE", "home/+/temp".to_string()),
        ("TEMPNODE_MQTT_PUBLISH_DELAY_MS", "500".to_string()),
    ]))
    .await
    .unwrap();
    tokio::fs::remove_file(&path).await.ok();

    let errors = ConfigStore::load(&provisioning.raw, &provisioning.policy).unwrap_err();
    let fields: Vec<_> = errors.iter().filter_map(ConfigError::field).collect();
    assert_eq!(
        fields,
        vec![field::MQTT_TOPIC_TEMPERATURE, field::MQTT_PUBLISH_DELAY_MS]
    );
    assert!(errors.contains(&ConfigError::DelayTooSmall(500, 1000)));
}

#[tokio::test]
async fn shared_config_is_readable_from_tasks() {
    let path = scratch_file("shared.toml");
    tokio::fs::write(&path, PROVISIONING).await.unwrap();

    let provisioning = resolve_with(lookup_from(vec![(
        CONFIG_PATH_ENV,
        path.to_string_lossy().to_string(),
    )]))
    .await
    .unwrap();
    tokio::fs::remove_file(&path).await.ok();

    let store = ConfigStore::load(&provisioning.raw, &provisioning.policy).unwrap();

    let wifi_view = store.shared();
    let publisher_view = store.shared();
    let wifi_task = tokio::spawn(async move { wifi_view.wifi_ssid().to_string() });
    let publisher_task =
        tokio::spawn(async move { publisher_view.publish().topic_state.to_string() });

    assert_eq!(wifi_task.await.unwrap(), "home");
    assert_eq!(publisher_task.await.unwrap(), "home/s1/status");
    assert_eq!(Arc::strong_count(&store.shared()), 2);
}
