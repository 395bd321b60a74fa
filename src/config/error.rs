//! Error definitions for configuration loading

use std::fmt;
use thiserror::Error;

use super::address::AddressError;
use super::topic::TopicError;

/// A single violated constraint, tagged with the raw field it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required field is missing or empty
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// A text field exceeds its byte limit
    #[error("field `{0}` is {1} bytes long, the limit is {2} bytes")]
    FieldTooLong(&'static str, usize, usize),

    /// The broker address is not a hostname or IP literal
    #[error("invalid MQTT server address `{0}`: {1}")]
    InvalidServerAddress(String, AddressError),

    /// mqtt_user and mqtt_password are not both present or both absent
    #[error("mqtt_user and mqtt_password must either both be set or both be absent")]
    InvalidCredentialPairing,

    /// A topic violates MQTT topic-name rules
    #[error("invalid topic in `{0}`: {1}")]
    InvalidTopic(&'static str, TopicError),

    /// Temperature and state would be published on the same topic
    #[error("temperature and state topics are both `{0}`")]
    DuplicateTopic(String),

    /// Publish delay below the configured floor
    #[error("publish delay of {0} ms is below the floor of {1} ms")]
    DelayTooSmall(u64, u64),

    /// Publish delay not representable as a 32-bit millisecond duration
    #[error("publish delay of {0} ms exceeds the maximum of {1} ms")]
    DelayTooLarge(u64, u64),

    /// Client id that a broker would reject regardless of length
    #[error("invalid client id `{0}`: {1}")]
    InvalidClientId(String, &'static str),

    /// Client id longer than the strict-mode limit
    #[error("client id `{0}` is longer than {1} bytes")]
    ClientIdTooLong(String, usize),
}

impl ConfigError {
    /// Raw field the violation belongs to, `None` for cross-field rules.
    pub fn field(&self) -> Option<&'static str> {
        use super::field;

        match self {
            ConfigError::EmptyField(name)
            | ConfigError::FieldTooLong(name, _, _)
            | ConfigError::InvalidTopic(name, _) => Some(*name),
            ConfigError::InvalidServerAddress(..) => Some(field::MQTT_SERVER),
            ConfigError::InvalidCredentialPairing | ConfigError::DuplicateTopic(_) => None,
            ConfigError::DelayTooSmall(..) | ConfigError::DelayTooLarge(..) => {
                Some(field::MQTT_PUBLISH_DELAY_MS)
            }
            ConfigError::InvalidClientId(..) | ConfigError::ClientIdTooLong(..) => {
                Some(field::MQTT_CLIENT_ID)
            }
        }
    }
}

/// Every violation found by one load attempt, in field-declaration order.
///
/// Never empty: it is only built by the validator when at least one
/// constraint failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(Vec<ConfigError>);

impl ConfigErrors {
    pub(crate) fn new(errors: Vec<ConfigError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First violation in field-declaration order
    pub fn first(&self) -> Option<&ConfigError> {
        self.0.first()
    }

    pub fn contains(&self, error: &ConfigError) -> bool {
        self.0.contains(error)
    }

    pub fn into_vec(self) -> Vec<ConfigError> {
        self.0
    }
}

impl ConfigErrors {
    /// One-line count without the individual violations.
    pub fn summary(&self) -> String {
        format!("configuration rejected with {} error(s)", self.0.len())
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

impl IntoIterator for ConfigErrors {
    type Item = ConfigError;
    type IntoIter = std::vec::IntoIter<ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigErrors {
    type Item = &'a ConfigError;
    type IntoIter = std::slice::Iter<'a, ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
