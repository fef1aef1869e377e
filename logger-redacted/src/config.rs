// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub redaction_enabled: bool,
    /// Replace redacted values with a short hash so log lines can be correlated
    pub hash_for_correlation: bool,
    pub log_level: String,
    pub json: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            hash_for_correlation: false,
            log_level: "info".to_string(),
            json: false,
        }
    }
}
