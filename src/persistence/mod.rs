//! # Persistence Module
//!
//! ## Why This Module Exists
//! The validator only understands [`RawConfig`]. This module is where raw values
//! come from: constants compiled into the firmware image, a TOML provisioning
//! file, and `TEMPNODE_*` environment variables. Sources are only ever read;
//! nothing is written back.
//!
//! ## Layering
//! ```text
//! compiled constants  ◄── lowest precedence
//!        ▲
//! provisioning file   (TEMPNODE_CONFIG or ~/.config/tempnode/provisioning.toml)
//!        ▲
//! environment         ◄── highest precedence
//! ```
//! Each layer replaces only the fields it provides (see [`RawConfig::overlay`]).
//!
//! ## Error Handling Strategy
//! Problems with a source itself (unreadable file, broken TOML, a non-numeric
//! port in the environment) are reported through `color_eyre` with context.
//! Problems with the values are left to the validator so they are reported
//! together with everything else.

pub mod provisioning;

use crate::config::{RawConfig, ValidationPolicy};
use serde::{Deserialize, Serialize};

pub use provisioning::{
    compiled_defaults, parse_provisioning, raw_from_env, raw_from_lookup, read_provisioning_file,
    resolve, resolve_with, Provisioning, ProvisioningSource,
};

/// Directory below the home directory holding the provisioning file
pub const CONFIG_DIR: &str = ".config/tempnode";
/// File name of the provisioning file
pub const PROVISIONING_FILE: &str = "provisioning.toml";
/// Environment variable naming an explicit provisioning file
pub const CONFIG_PATH_ENV: &str = "TEMPNODE_CONFIG";
/// Prefix of the per-field environment variables
pub const ENV_PREFIX: &str = "TEMPNODE_";

/// Publish interval used when the build does not set one
pub const DEFAULT_PUBLISH_DELAY_MS: u64 = 15_000;

/// On-disk layout of a provisioning file.
///
/// ```toml
/// [connection]
/// wifi_ssid = "home"
/// mqtt_server = "10.0.0.5"
/// mqtt_client_id = "s1"
///
/// [validation]
/// strict_client_id = false
/// ```
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisioningFile {
    /// Connection parameters, all optional
    pub connection: RawConfig,
    /// Validator settings, defaults apply to omitted keys
    pub validation: ValidationPolicy,
}
