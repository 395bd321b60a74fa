use super::{
    ProvisioningFile, CONFIG_DIR, CONFIG_PATH_ENV, DEFAULT_PUBLISH_DELAY_MS, ENV_PREFIX,
    PROVISIONING_FILE,
};
use crate::config::{field, RawConfig, ValidationPolicy};
use color_eyre::{eyre::eyre, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a layer of the final [`RawConfig`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningSource {
    Compiled,
    File(PathBuf),
    Environment,
}

impl fmt::Display for ProvisioningSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningSource::Compiled => f.write_str("compiled constants"),
            ProvisioningSource::File(path) => write!(f, "file {}", path.display()),
            ProvisioningSource::Environment => f.write_str("environment"),
        }
    }
}

/// Merged raw input plus the policy to validate it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioning {
    pub raw: RawConfig,
    pub policy: ValidationPolicy,
    /// Layers that contributed at least one field, lowest precedence first
    pub sources: Vec<ProvisioningSource>,
}

fn env_key(field: &str) -> String {
    format!("{}{}", ENV_PREFIX, field.to_ascii_uppercase())
}

fn parse_value<T: std::str::FromStr>(name: &str, value: String) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| eyre!("Failed to parse {} value `{}`: {}", env_key(name), value, e))
}

/// Builds a [`RawConfig`] from `TEMPNODE_<FIELD>` keys answered by `lookup`.
///
/// Variables cannot express "absent", so an empty `TEMPNODE_MQTT_USER` selects
/// anonymous access (an empty `TEMPNODE_MQTT_PASSWORD` next to it is dropped).
pub fn raw_from_lookup<F>(lookup: F) -> Result<RawConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let text = |name: &str| lookup(&env_key(name));

    let mut mqtt_anonymous = text(field::MQTT_ANONYMOUS)
        .map(|value| parse_value(field::MQTT_ANONYMOUS, value))
        .transpose()?;
    let mut mqtt_user = text(field::MQTT_USER);
    let mut mqtt_password = text(field::MQTT_PASSWORD);
    if mqtt_user.as_deref() == Some("") {
        mqtt_user = None;
        mqtt_anonymous = Some(true);
        if mqtt_password.as_deref() == Some("") {
            mqtt_password = None;
        }
    }

    let mqtt_port = text(field::MQTT_PORT)
        .map(|value| parse_value(field::MQTT_PORT, value))
        .transpose()?;
    let mqtt_publish_delay_ms = text(field::MQTT_PUBLISH_DELAY_MS)
        .map(|value| parse_value(field::MQTT_PUBLISH_DELAY_MS, value))
        .transpose()?;

    Ok(RawConfig {
        wifi_ssid: text(field::WIFI_SSID),
        wifi_password: text(field::WIFI_PASSWORD),
        mqtt_server: text(field::MQTT_SERVER),
        mqtt_port,
        mqtt_user,
        mqtt_password,
        mqtt_anonymous,
        mqtt_topic_temperature: text(field::MQTT_TOPIC_TEMPERATURE),
        mqtt_topic_state: text(field::MQTT_TOPIC_STATE),
        mqtt_publish_delay_ms,
        mqtt_client_id: text(field::MQTT_CLIENT_ID),
    })
}

/// Reads the process environment at runtime.
pub fn raw_from_env() -> Result<RawConfig> {
    raw_from_lookup(|key| std::env::var(key).ok())
}

fn compiled_lookup(key: &str) -> Option<String> {
    let value = match key {
        "TEMPNODE_WIFI_SSID" => option_env!("TEMPNODE_WIFI_SSID"),
        "TEMPNODE_WIFI_PASSWORD" => option_env!("TEMPNODE_WIFI_PASSWORD"),
        "TEMPNODE_MQTT_SERVER" => option_env!("TEMPNODE_MQTT_SERVER"),
        "TEMPNODE_MQTT_PORT" => option_env!("TEMPNODE_MQTT_PORT"),
        "TEMPNODE_MQTT_USER" => option_env!("TEMPNODE_MQTT_USER"),
        "TEMPNODE_MQTT_PASSWORD" => option_env!("TEMPNODE_MQTT_PASSWORD"),
        "TEMPNODE_MQTT_ANONYMOUS" => option_env!("TEMPNODE_MQTT_ANONYMOUS"),
        "TEMPNODE_MQTT_TOPIC_TEMPERATURE" => option_env!("TEMPNODE_MQTT_TOPIC_TEMPERATURE"),
        "TEMPNODE_MQTT_TOPIC_STATE" => option_env!("TEMPNODE_MQTT_TOPIC_STATE"),
        "TEMPNODE_MQTT_PUBLISH_DELAY_MS" => option_env!("TEMPNODE_MQTT_PUBLISH_DELAY_MS"),
        "TEMPNODE_MQTT_CLIENT_ID" => option_env!("TEMPNODE_MQTT_CLIENT_ID"),
        _ => None,
    };
    value.map(str::to_owned)
}

/// Constants baked in at build time from `TEMPNODE_*` variables.
///
/// The publish delay falls back to [`DEFAULT_PUBLISH_DELAY_MS`] when the build
/// does not set one.
pub fn compiled_defaults() -> Result<RawConfig> {
    let mut raw =
        raw_from_lookup(compiled_lookup).map_err(|e| eyre!("Invalid compiled constant: {}", e))?;
    raw.mqtt_publish_delay_ms.get_or_insert(DEFAULT_PUBLISH_DELAY_MS);
    Ok(raw)
}

pub fn parse_provisioning(content: &str) -> Result<ProvisioningFile> {
    toml::from_str(content).map_err(|e| eyre!("Failed to parse provisioning file: {}", e))
}

pub async fn read_provisioning_file(path: &Path) -> Result<ProvisioningFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| eyre!("Failed to read provisioning file {}: {}", path.display(), e))?;

    parse_provisioning(&content).map_err(|e| eyre!("{}: {}", path.display(), e))
}

fn default_provisioning_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    });
    path.push(CONFIG_DIR);
    path.push(PROVISIONING_FILE);
    path
}

/// Resolves all layers from the real process environment.
pub async fn resolve() -> Result<Provisioning> {
    resolve_with(|key| std::env::var(key).ok()).await
}

/// Resolves compiled constants, the provisioning file and the environment
/// answered by `lookup`, in that order of precedence.
///
/// An explicitly named file (`TEMPNODE_CONFIG`) must exist; the default
/// location is skipped when absent.
pub async fn resolve_with<F>(lookup: F) -> Result<Provisioning>
where
    F: Fn(&str) -> Option<String>,
{
    let mut sources = Vec::new();

    let compiled = compiled_defaults()?;
    let mut raw = compiled.clone();
    if compiled != RawConfig::default() {
        sources.push(ProvisioningSource::Compiled);
    }

    let (path, required) = match lookup(CONFIG_PATH_ENV) {
        Some(path) => (PathBuf::from(path), true),
        None => (default_provisioning_path(), false),
    };

    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| eyre!("Failed to check provisioning file {}: {}", path.display(), e))?;

    let mut policy = ValidationPolicy::default();
    if exists {
        let file = read_provisioning_file(&path).await?;
        info!("Using provisioning file {}", path.display());
        raw = raw.overlay(file.connection);
        policy = file.validation;
        sources.push(ProvisioningSource::File(path));
    } else if required {
        return Err(eyre!(
            "Provisioning file named by {} does not exist: {}",
            CONFIG_PATH_ENV,
            path.display()
        ));
    } else {
        debug!(
            "No provisioning file at {}, continuing without",
            path.display()
        );
    }

    let env = raw_from_lookup(&lookup)?;
    if !env.is_empty() {
        debug!("Applying environment overrides");
        raw = raw.overlay(env);
        sources.push(ProvisioningSource::Environment);
    }

    Ok(Provisioning {
        raw,
        policy,
        sources,
    })
}
