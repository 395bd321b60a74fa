use serde::{Deserialize, Serialize};

/// Lowest publish interval accepted unless the policy says otherwise
pub const DEFAULT_PUBLISH_DELAY_FLOOR_MS: u64 = 1_000;

/// Client id limit every MQTT 3.1.1 broker must accept
pub const MQTT_311_CLIENT_ID_LIMIT: usize = 23;

/// Tunable constraints applied by the validator.
///
/// Read from the optional `[validation]` table of a provisioning file; every
/// key may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationPolicy {
    /// Smallest accepted `mqtt_publish_delay_ms`
    pub publish_delay_floor_ms: u64,
    /// Enforce `client_id_limit`
    pub strict_client_id: bool,
    /// Maximum client id length in bytes when `strict_client_id` is set
    pub client_id_limit: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            publish_delay_floor_ms: DEFAULT_PUBLISH_DELAY_FLOOR_MS,
            strict_client_id: true,
            client_id_limit: MQTT_311_CLIENT_ID_LIMIT,
        }
    }
}

impl ValidationPolicy {
    /// Default floor, no client id length limit (MQTT 5 brokers and most 3.1.1 brokers)
    pub fn relaxed() -> Self {
        Self {
            strict_client_id: false,
            ..Self::default()
        }
    }

    pub fn with_publish_delay_floor_ms(mut self, floor_ms: u64) -> Self {
        self.publish_delay_floor_ms = floor_ms;
        self
    }

    pub fn with_client_id_limit(mut self, limit: usize) -> Self {
        self.strict_client_id = true;
        self.client_id_limit = limit;
        self
    }

    /// Active client id limit, `None` when strict mode is off
    pub fn client_id_limit(&self) -> Option<usize> {
        self.strict_client_id.then_some(self.client_id_limit)
    }
}
