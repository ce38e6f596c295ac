use std::sync::Arc;

use causa_transport::Transport;

use crate::bucket::Bucket;
use crate::config::ClientConfig;

/// Long-lived handle shared by every command: transport plus configuration.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl Session {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(Arc::new(transport), ClientConfig::default())
    }

    pub fn with_config(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A bucket in the configured default bucket type.
    pub fn bucket(&self, name: impl Into<String>) -> Bucket {
        Bucket::new(name, self.config.default_bucket_type.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
