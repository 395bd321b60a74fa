//! Field-by-field validation of a [`RawConfig`].
//!
//! Violations are collected rather than returned on the first hit, and are
//! reported in the order the fields are declared in [`RawConfig`].

use tracing::{debug, warn};

use super::address::BrokerAddress;
use super::connection::{ConnectionConfig, MqttCredentials, WifiAuth};
use super::error::{ConfigError, ConfigErrors};
use super::field;
use super::policy::ValidationPolicy;
use super::raw::RawConfig;
use super::topic::TopicName;

/// IEEE 802.11 SSID limit
pub const MAX_SSID_LEN: usize = 32;

/// WPA2 passphrase limit
pub const MAX_WIFI_PASSWORD_LEN: usize = 63;

/// Largest delay representable as a 32-bit millisecond count
pub const MAX_PUBLISH_DELAY_MS: u64 = u32::MAX as u64;

/// Validates every field of `raw` and builds the immutable configuration.
///
/// Pure: the same input always gives the same result and nothing is corrected.
/// On failure all violations are returned together.
pub fn load(raw: &RawConfig, policy: &ValidationPolicy) -> Result<ConnectionConfig, ConfigErrors> {
    let mut errors = Vec::new();

    let wifi_ssid = check_ssid(raw.wifi_ssid.as_deref(), &mut errors);
    let wifi_auth = check_wifi_password(raw.wifi_password.as_deref(), &mut errors);
    let broker = check_server(raw.mqtt_server.as_deref(), raw.mqtt_port, &mut errors);
    let credentials = check_credentials(
        raw.mqtt_user.as_deref(),
        raw.mqtt_password.as_deref(),
        raw.mqtt_anonymous.unwrap_or(false),
        &mut errors,
    );
    let topic_temperature = check_topic(
        field::MQTT_TOPIC_TEMPERATURE,
        raw.mqtt_topic_temperature.as_deref(),
        &mut errors,
    );
    let topic_state = check_topic(
        field::MQTT_TOPIC_STATE,
        raw.mqtt_topic_state.as_deref(),
        &mut errors,
    );
    if let (Some(temperature), Some(state)) = (&topic_temperature, &topic_state) {
        if temperature == state {
            errors.push(ConfigError::DuplicateTopic(temperature.to_string()));
        }
    }
    let publish_delay_ms = check_delay(raw.mqtt_publish_delay_ms, policy, &mut errors);
    let client_id = check_client_id(raw.mqtt_client_id.as_deref(), policy, &mut errors);

    if let (
        Some(wifi_ssid),
        Some(wifi_auth),
        Some(broker),
        Some(credentials),
        Some(topic_temperature),
        Some(topic_state),
        Some(publish_delay_ms),
        Some(client_id),
    ) = (
        wifi_ssid,
        wifi_auth,
        broker,
        credentials,
        topic_temperature,
        topic_state,
        publish_delay_ms,
        client_id,
    ) {
        if errors.is_empty() {
            debug!(
                "Validated configuration for client {} on broker {}",
                client_id, broker
            );
            return Ok(ConnectionConfig {
                wifi_ssid,
                wifi_auth,
                broker,
                credentials,
                topic_temperature,
                topic_state,
                publish_delay_ms,
                client_id,
            });
        }
    }

    warn!("Configuration rejected with {} error(s)", errors.len());
    Err(ConfigErrors::new(errors))
}

fn required<'a>(
    name: &'static str,
    value: Option<&'a str>,
    errors: &mut Vec<ConfigError>,
) -> Option<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.push(ConfigError::EmptyField(name));
            None
        }
    }
}

fn check_ssid(value: Option<&str>, errors: &mut Vec<ConfigError>) -> Option<String> {
    let ssid = required(field::WIFI_SSID, value, errors)?;
    if ssid.len() > MAX_SSID_LEN {
        errors.push(ConfigError::FieldTooLong(
            field::WIFI_SSID,
            ssid.len(),
            MAX_SSID_LEN,
        ));
        return None;
    }
    Some(ssid.to_owned())
}

fn check_wifi_password(value: Option<&str>, errors: &mut Vec<ConfigError>) -> Option<WifiAuth> {
    match value {
        None | Some("") => Some(WifiAuth::Open),
        Some(password) if password.len() > MAX_WIFI_PASSWORD_LEN => {
            errors.push(ConfigError::FieldTooLong(
                field::WIFI_PASSWORD,
                password.len(),
                MAX_WIFI_PASSWORD_LEN,
            ));
            None
        }
        Some(password) => Some(WifiAuth::Wpa2 {
            passphrase: password.to_owned(),
        }),
    }
}

fn check_server(
    value: Option<&str>,
    port: Option<u16>,
    errors: &mut Vec<ConfigError>,
) -> Option<BrokerAddress> {
    let server = required(field::MQTT_SERVER, value, errors)?;
    match BrokerAddress::parse(server, port) {
        Ok(address) => Some(address),
        Err(e) => {
            errors.push(ConfigError::InvalidServerAddress(server.to_owned(), e));
            None
        }
    }
}

fn check_credentials(
    user: Option<&str>,
    password: Option<&str>,
    anonymous: bool,
    errors: &mut Vec<ConfigError>,
) -> Option<MqttCredentials> {
    if anonymous && (user.is_some() || password.is_some()) {
        errors.push(ConfigError::InvalidCredentialPairing);
        return None;
    }

    match (user, password) {
        (None, None) => Some(MqttCredentials::Anonymous),
        (Some(""), _) => {
            errors.push(ConfigError::EmptyField(field::MQTT_USER));
            None
        }
        (Some(user), Some(password)) => Some(MqttCredentials::Password {
            user: user.to_owned(),
            password: password.to_owned(),
        }),
        (None, Some(_)) | (Some(_), None) => {
            errors.push(ConfigError::InvalidCredentialPairing);
            None
        }
    }
}

fn check_topic(
    name: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ConfigError>,
) -> Option<TopicName> {
    let topic = required(name, value, errors)?;
    match TopicName::parse(topic) {
        Ok(topic) => Some(topic),
        Err(e) => {
            errors.push(ConfigError::InvalidTopic(name, e));
            None
        }
    }
}

fn check_delay(
    value: Option<u64>,
    policy: &ValidationPolicy,
    errors: &mut Vec<ConfigError>,
) -> Option<u32> {
    let Some(delay) = value else {
        errors.push(ConfigError::EmptyField(field::MQTT_PUBLISH_DELAY_MS));
        return None;
    };

    // a zero interval is never valid, whatever the policy says
    let floor = policy.publish_delay_floor_ms.max(1);
    if delay < floor {
        errors.push(ConfigError::DelayTooSmall(delay, floor));
        return None;
    }
    match u32::try_from(delay) {
        Ok(delay) => Some(delay),
        Err(_) => {
            errors.push(ConfigError::DelayTooLarge(delay, MAX_PUBLISH_DELAY_MS));
            None
        }
    }
}

fn check_client_id(
    value: Option<&str>,
    policy: &ValidationPolicy,
    errors: &mut Vec<ConfigError>,
) -> Option<String> {
    let client_id = required(field::MQTT_CLIENT_ID, value, errors)?;

    if client_id.starts_with(char::is_whitespace) {
        errors.push(ConfigError::InvalidClientId(
            client_id.to_owned(),
            "starts with whitespace",
        ));
        return None;
    }
    if let Some(limit) = policy.client_id_limit() {
        if client_id.len() > limit {
            errors.push(ConfigError::ClientIdTooLong(client_id.to_owned(), limit));
            return None;
        }
    }

    Some(client_id.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::address::DEFAULT_MQTT_PORT;
    use crate::config::topic::TopicError;

    fn sensor_raw() -> RawConfig {
        RawConfig {
            wifi_ssid: Some("home".into()),
            wifi_password: Some("secret".into()),
            mqtt_server: Some("10.0.0.5".into()),
            mqtt_port: None,
            mqtt_user: None,
            mqtt_password: None,
            mqtt_anonymous: None,
            mqtt_topic_temperature: Some("home/s1/temp".into()),
            mqtt_topic_state: Some("home/s1/status".into()),
            mqtt_publish_delay_ms: Some(15_000),
            mqtt_client_id: Some("s1".into()),
        }
    }

    fn errors_of(raw: &RawConfig) -> Vec<ConfigError> {
        load(raw, &ValidationPolicy::default())
            .unwrap_err()
            .into_vec()
    }

    #[test]
    fn sensor_scenario_loads() {
        let config = load(&sensor_raw(), &ValidationPolicy::default()).unwrap();

        assert_eq!(config.wifi_ssid(), "home");
        assert_eq!(config.wifi_auth().passphrase(), Some("secret"));
        assert_eq!(config.broker().to_string(), "10.0.0.5:1883");
        assert_eq!(config.broker().port(), DEFAULT_MQTT_PORT);
        assert_eq!(config.credentials(), &MqttCredentials::Anonymous);
        assert_eq!(config.topic_temperature().as_str(), "home/s1/temp");
        assert_eq!(config.topic_state().as_str(), "home/s1/status");
        assert_eq!(config.publish_delay_ms(), 15_000);
        assert_eq!(config.client_id(), "s1");
    }

    #[test]
    fn empty_ssid_is_reported() {
        let mut raw = sensor_raw();
        raw.wifi_ssid = Some(String::new());
        assert_eq!(errors_of(&raw), vec![ConfigError::EmptyField("wifi_ssid")]);

        raw.wifi_ssid = None;
        assert_eq!(errors_of(&raw), vec![ConfigError::EmptyField("wifi_ssid")]);
    }

    #[test]
    fn ssid_and_password_limits() {
        let mut raw = sensor_raw();
        raw.wifi_ssid = Some("s".repeat(33));
        raw.wifi_password = Some("p".repeat(64));

        assert_eq!(
            errors_of(&raw),
            vec![
                ConfigError::FieldTooLong(field::WIFI_SSID, 33, MAX_SSID_LEN),
                ConfigError::FieldTooLong(field::WIFI_PASSWORD, 64, MAX_WIFI_PASSWORD_LEN),
            ]
        );
    }

    #[test]
    fn empty_password_means_open_network() {
        let mut raw = sensor_raw();
        raw.wifi_password = Some(String::new());
        let config = load(&raw, &ValidationPolicy::default()).unwrap();
        assert_eq!(config.wifi_auth(), &WifiAuth::Open);

        raw.wifi_password = None;
        let config = load(&raw, &ValidationPolicy::default()).unwrap();
        assert_eq!(config.wifi().auth, &WifiAuth::Open);
    }

    #[test]
    fn password_without_user_is_a_pairing_error() {
        let mut raw = sensor_raw();
        raw.mqtt_password = Some("pw".into());
        assert_eq!(errors_of(&raw), vec![ConfigError::InvalidCredentialPairing]);

        let mut raw = sensor_raw();
        raw.mqtt_user = Some("sensor".into());
        assert_eq!(errors_of(&raw), vec![ConfigError::InvalidCredentialPairing]);
    }

    #[test]
    fn user_with_empty_password_authenticates() {
        let mut raw = sensor_raw();
        raw.mqtt_user = Some("sensor".into());
        raw.mqtt_password = Some(String::new());

        let config = load(&raw, &ValidationPolicy::default()).unwrap();
        assert_eq!(config.credentials().user(), Some("sensor"));
        assert_eq!(config.credentials().password(), Some(""));
    }

    #[test]
    fn anonymous_flag_means_no_authentication() {
        let mut raw = sensor_raw();
        raw.mqtt_anonymous = Some(true);
        let config = load(&raw, &ValidationPolicy::default()).unwrap();
        assert_eq!(config.credentials(), &MqttCredentials::Anonymous);

        raw.mqtt_password = Some("pw".into());
        assert_eq!(errors_of(&raw), vec![ConfigError::InvalidCredentialPairing]);

        let mut raw = sensor_raw();
        raw.mqtt_anonymous = Some(false);
        raw.mqtt_user = Some("sensor".into());
        raw.mqtt_password = Some("pw".into());
        let config = load(&raw, &ValidationPolicy::default()).unwrap();
        assert_eq!(config.credentials().user(), Some("sensor"));
    }

    #[test]
    fn empty_user_is_an_empty_field() {
        let mut raw = sensor_raw();
        raw.mqtt_user = Some(String::new());
        raw.mqtt_password = Some("pw".into());
        assert_eq!(errors_of(&raw), vec![ConfigError::EmptyField(field::MQTT_USER)]);
    }

    #[test]
    fn wildcard_topics_are_rejected() {
        let mut raw = sensor_raw();
        raw.mqtt_topic_temperature = Some("home/+/temp".into());
        raw.mqtt_topic_state = Some("home/s1/#".into());

        assert_eq!(
            errors_of(&raw),
            vec![
                ConfigError::InvalidTopic(field::MQTT_TOPIC_TEMPERATURE, TopicError::Wildcard('+')),
                ConfigError::InvalidTopic(field::MQTT_TOPIC_STATE, TopicError::Wildcard('#')),
            ]
        );
    }

    #[test]
    fn identical_topics_are_rejected() {
        let mut raw = sensor_raw();
        raw.mqtt_topic_state = raw.mqtt_topic_temperature.clone();
        assert_eq!(
            errors_of(&raw),
            vec![ConfigError::DuplicateTopic("home/s1/temp".into())]
        );
    }

    #[test]
    fn delay_bounds() {
        let mut raw = sensor_raw();
        raw.mqtt_publish_delay_ms = Some(500);
        assert_eq!(errors_of(&raw), vec![ConfigError::DelayTooSmall(500, 1000)]);

        raw.mqtt_publish_delay_ms = Some(1_000);
        assert!(load(&raw, &ValidationPolicy::default()).is_ok());

        raw.mqtt_publish_delay_ms = Some(MAX_PUBLISH_DELAY_MS + 1);
        assert_eq!(
            errors_of(&raw),
            vec![ConfigError::DelayTooLarge(
                MAX_PUBLISH_DELAY_MS + 1,
                MAX_PUBLISH_DELAY_MS
            )]
        );

        raw.mqtt_publish_delay_ms = None;
        assert_eq!(
            errors_of(&raw),
            vec![ConfigError::EmptyField(field::MQTT_PUBLISH_DELAY_MS)]
        );
    }

    #[test]
    fn zero_delay_is_rejected_even_without_floor() {
        let mut raw = sensor_raw();
        raw.mqtt_publish_delay_ms = Some(0);
        let policy = ValidationPolicy::default().with_publish_delay_floor_ms(0);

        let errors = load(&raw, &policy).unwrap_err();
        assert_eq!(errors.first(), Some(&ConfigError::DelayTooSmall(0, 1)));
        assert_eq!(
            errors.first().map(ToString::to_string).as_deref(),
            Some("publish delay of 0 ms is below the floor of 1 ms")
        );

        raw.mqtt_publish_delay_ms = Some(1);
        assert!(load(&raw, &policy).is_ok());
    }

    #[test]
    fn client_id_limit_follows_policy() {
        let mut raw = sensor_raw();
        let long_id = "living-room-sensor-0001-a";
        raw.mqtt_client_id = Some(long_id.into());

        assert_eq!(
            errors_of(&raw),
            vec![ConfigError::ClientIdTooLong(long_id.into(), 23)]
        );

        let config = load(&raw, &ValidationPolicy::relaxed()).unwrap();
        assert_eq!(config.client_id(), long_id);
    }

    #[test]
    fn client_id_must_not_start_with_whitespace() {
        let mut raw = sensor_raw();
        raw.mqtt_client_id = Some(" s1".into());
        assert_eq!(
            errors_of(&raw),
            vec![ConfigError::InvalidClientId(
                " s1".into(),
                "starts with whitespace"
            )]
        );
    }

    #[test]
    fn all_violations_are_reported_in_field_order() {
        let raw = RawConfig {
            mqtt_server: Some("broker:99999".into()),
            mqtt_password: Some("pw".into()),
            mqtt_topic_state: Some("/status".into()),
            mqtt_publish_delay_ms: Some(10),
            ..RawConfig::default()
        };

        let errors = errors_of(&raw);
        assert_eq!(errors.len(), 7);
        assert_eq!(errors[0], ConfigError::EmptyField(field::WIFI_SSID));
        assert!(matches!(
            errors[1],
            ConfigError::InvalidServerAddress(ref value, _) if value == "broker:99999"
        ));
        assert_eq!(errors[2], ConfigError::InvalidCredentialPairing);
        assert_eq!(
            errors[3],
            ConfigError::EmptyField(field::MQTT_TOPIC_TEMPERATURE)
        );
        assert_eq!(
            errors[4],
            ConfigError::InvalidTopic(field::MQTT_TOPIC_STATE, TopicError::LeadingSeparator)
        );
        assert_eq!(errors[5], ConfigError::DelayTooSmall(10, 1000));
        assert_eq!(errors[6], ConfigError::EmptyField(field::MQTT_CLIENT_ID));
    }

    #[test]
    fn load_is_deterministic() {
        let raw = sensor_raw();
        let policy = ValidationPolicy::default();
        assert_eq!(load(&raw, &policy), load(&raw, &policy));

        let mut broken = sensor_raw();
        broken.wifi_ssid = None;
        assert_eq!(load(&broken, &policy), load(&broken, &policy));
    }
}
