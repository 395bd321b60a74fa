//! Broker address parsing.
//!
//! Accepted forms: `host`, `host:port`, `1.2.3.4`, `1.2.3.4:port`, `::1`,
//! `[::1]` and `[::1]:port`. A separately provisioned port must agree with an
//! embedded one.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use thiserror::Error;

/// Standard unencrypted MQTT port
pub const DEFAULT_MQTT_PORT: u16 = 1883;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address contains whitespace")]
    Whitespace,

    #[error("`{0}` is not a valid hostname: {1}")]
    InvalidHostname(String, &'static str),

    #[error("`{0}` is not a valid IPv6 literal")]
    InvalidIpv6(String),

    #[error("`{0}` is not a valid port")]
    InvalidPort(String),

    #[error("port 0 cannot be connected to")]
    PortZero,

    #[error("address names port {0} but mqtt_port is {1}")]
    PortConflict(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerHost {
    Name(String),
    Ip(IpAddr),
}

impl fmt::Display for BrokerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerHost::Name(name) => f.write_str(name),
            BrokerHost::Ip(ip) => write!(f, "{}", ip),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    host: BrokerHost,
    port: u16,
}

impl BrokerAddress {
    /// Parses `server` and combines it with an optional separately provisioned port.
    pub fn parse(server: &str, port: Option<u16>) -> Result<Self, AddressError> {
        if server.chars().any(char::is_whitespace) {
            return Err(AddressError::Whitespace);
        }

        let (host, embedded_port) = split_host_port(server)?;

        let port = match (embedded_port, port) {
            (Some(embedded), Some(explicit)) if embedded != explicit => {
                return Err(AddressError::PortConflict(embedded, explicit))
            }
            (Some(port), _) | (None, Some(port)) => port,
            (None, None) => DEFAULT_MQTT_PORT,
        };
        if port == 0 {
            return Err(AddressError::PortZero);
        }

        Ok(Self { host, port })
    }

    pub fn host(&self) -> &BrokerHost {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host {
            BrokerHost::Ip(IpAddr::V6(ip)) => write!(f, "[{}]:{}", ip, self.port),
            _ => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

fn split_host_port(server: &str) -> Result<(BrokerHost, Option<u16>), AddressError> {
    if let Some(rest) = server.strip_prefix('[') {
        let (literal, tail) = rest
            .split_once(']')
            .ok_or_else(|| AddressError::InvalidIpv6(server.to_owned()))?;
        let ip: Ipv6Addr = literal
            .parse()
            .map_err(|_| AddressError::InvalidIpv6(literal.to_owned()))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(parse_port(port)?),
            None if tail.is_empty() => None,
            None => return Err(AddressError::InvalidPort(tail.to_owned())),
        };
        return Ok((BrokerHost::Ip(IpAddr::V6(ip)), port));
    }

    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok((BrokerHost::Ip(ip), None));
    }

    match server.matches(':').count() {
        0 => Ok((parse_host(server)?, None)),
        1 => {
            let (host, port) = server
                .split_once(':')
                .ok_or_else(|| AddressError::InvalidPort(server.to_owned()))?;
            Ok((parse_host(host)?, Some(parse_port(port)?)))
        }
        _ => Err(AddressError::InvalidIpv6(server.to_owned())),
    }
}

fn parse_host(host: &str) -> Result<BrokerHost, AddressError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(BrokerHost::Ip(ip));
    }
    validate_hostname(host)?;
    Ok(BrokerHost::Name(host.to_owned()))
}

fn validate_hostname(host: &str) -> Result<(), AddressError> {
    let invalid = |reason| Err(AddressError::InvalidHostname(host.to_owned(), reason));

    // a single trailing dot marks a fully qualified name
    let name = host.strip_suffix('.').unwrap_or(host);

    if name.is_empty() {
        return invalid("empty host");
    }
    if name.len() > MAX_HOSTNAME_LEN {
        return invalid("longer than 253 bytes");
    }

    let mut all_numeric = true;
    for label in name.split('.') {
        if label.is_empty() {
            return invalid("empty label");
        }
        if label.len() > MAX_LABEL_LEN {
            return invalid("label longer than 63 bytes");
        }
        // '_' is outside RFC 1123 but resolvers accept it
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return invalid("only letters, digits, '-', '_' and '.' are allowed");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return invalid("label starts or ends with '-'");
        }
        all_numeric &= label.chars().all(|c| c.is_ascii_digit());
    }
    if all_numeric {
        return invalid("looks like a malformed IPv4 literal");
    }

    Ok(())
}

fn parse_port(port: &str) -> Result<u16, AddressError> {
    port.parse::<u16>()
        .map_err(|_| AddressError::InvalidPort(port.to_owned()))
}
