//! # MQTT Integration Module
//!
//! Translates a validated [`ConnectionConfig`](crate::config::ConnectionConfig)
//! into what the MQTT client collaborator consumes. Nothing here opens a socket;
//! the client built from these options owns the connection.
//!
//! ## Module Architecture
//!
//! ```text
//! mqtt/
//! └── options.rs  - rumqttc options, last will and state payloads
//! ```
//!
//! The state topic doubles as the node's availability topic: the client
//! publishes [`options::ONLINE_PAYLOAD`] once connected and the broker publishes
//! the retained last will [`options::OFFLINE_PAYLOAD`] when the node drops off.

pub mod options;

pub use options::{broker_label, client_options, KEEP_ALIVE, OFFLINE_PAYLOAD, ONLINE_PAYLOAD};
