use std::sync::Arc;
use std::time::Duration;

use dispatch_core::EventBus;
use dispatch_store::Store;

use crate::config::ServerConfig;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// Change events for the `/events` stream.
    pub events: EventBus,
    /// Client for send-next-3 webhook delivery.
    pub http: reqwest::Client,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Store, config: ServerConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.webhook_timeout_secs))
            .build()?;
        Ok(Self {
            store,
            events: EventBus::default(),
            http,
            config: Arc::new(config),
        })
    }
}
