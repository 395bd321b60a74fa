//! MQTT topic names used for publishing.
//!
//! A topic name (as opposed to a topic filter) must not contain the wildcard
//! characters `#` and `+`. On top of the protocol rules, topics starting with
//! `$` are refused because brokers reserve them (`$SYS/...`), and leading or
//! trailing `/` are refused because they create an empty first or last level
//! that is easy to mistype (`home/s1/temp` vs `home/s1/temp/`).

use std::fmt;
use thiserror::Error;

/// Maximum encoded length of an MQTT topic (u16 length prefix)
pub const MAX_TOPIC_LEN: usize = 65_535;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("topic is empty")]
    Empty,

    #[error("topic is {0} bytes long, the limit is {limit} bytes", limit = MAX_TOPIC_LEN)]
    TooLong(usize),

    #[error("topic contains a NUL character")]
    NulCharacter,

    #[error("topic contains the wildcard character `{0}`")]
    Wildcard(char),

    #[error("topics starting with `$` are reserved for the broker")]
    Reserved,

    #[error("topic starts with `/`")]
    LeadingSeparator,

    #[error("topic ends with `/`")]
    TrailingSeparator,
}

/// A validated topic name that can be published to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicName(String);

impl TopicName {
    pub fn parse(value: &str) -> Result<Self, TopicError> {
        if value.is_empty() {
            return Err(TopicError::Empty);
        }
        if value.len() > MAX_TOPIC_LEN {
            return Err(TopicError::TooLong(value.len()));
        }
        if value.contains('\0') {
            return Err(TopicError::NulCharacter);
        }
        if let Some(wildcard) = value.chars().find(|c| matches!(c, '#' | '+')) {
            return Err(TopicError::Wildcard(wildcard));
        }
        if value.starts_with('$') {
            return Err(TopicError::Reserved);
        }
        if value.starts_with('/') {
            return Err(TopicError::LeadingSeparator);
        }
        if value.ends_with('/') {
            return Err(TopicError::TrailingSeparator);
        }

        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Topic levels, split on `/`
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TopicName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for TopicName {
    type Error = TopicError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
