use std::path::Path;

use causa_resolve::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Client configuration, loadable from TOML.
///
/// ```toml
/// default_bucket_type = "default"
///
/// [engine]
/// sibling_warn_threshold = 8
///
/// [engine.write_back]
/// enabled = true
/// timeout_ms = 5000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Bucket type used by [`Session::bucket`](crate::Session::bucket).
    pub default_bucket_type: String,
    pub engine: EngineConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_bucket_type: "default".into(),
            engine: EngineConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> ClientResult<Self> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
