use causa_transport::Transport;
use causa_types::{CausalToken, Location, ResolvedConflict};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::WriteBackPolicy;

/// What happened to the write-back of a resolved conflict.
///
/// Never fatal to the read that triggered it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteBackReport {
    /// The resolution was stored; `causal_token` now covers the key.
    Stored { causal_token: CausalToken },
    /// The store rejected or failed the write.
    Failed { reason: String },
    /// No acknowledgement within the policy's timeout.
    TimedOut { after_ms: u64 },
    /// Write-back is turned off by configuration.
    Disabled,
}

impl WriteBackReport {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// Store `resolved` as a raw value under `location`, tagged with its token.
pub async fn write_back(
    transport: &dyn Transport,
    location: &Location,
    resolved: &ResolvedConflict,
    policy: &WriteBackPolicy,
) -> WriteBackReport {
    if !policy.enabled {
        debug!(%location, "write-back disabled");
        return WriteBackReport::Disabled;
    }

    let object = resolved.to_stored_object();
    match tokio::time::timeout(policy.timeout(), transport.store(location, object)).await {
        Ok(Ok(resp)) => {
            debug!(%location, token = %resp.causal_token.short_hex(), "conflict resolution stored");
            WriteBackReport::Stored {
                causal_token: resp.causal_token,
            }
        }
        Ok(Err(e)) => {
            warn!(%location, error = %e, "failed to store conflict resolution");
            WriteBackReport::Failed { reason: e.to_string() }
        }
        Err(_) => {
            warn!(%location, timeout_ms = policy.timeout_ms, "conflict resolution write-back timed out");
            WriteBackReport::TimedOut {
                after_ms: policy.timeout_ms,
            }
        }
    }
}
