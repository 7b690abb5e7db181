//! Application state shared by the HTTP handlers.

use std::sync::Arc;

use crate::adapter::Adapter;
use crate::api::JsonApi;
use crate::config::ServerConfig;

/// Shared application state.
///
/// # Type Parameters
///
/// * `A` - The adapter type shared by all registered resource types
pub struct AppState<A: Adapter> {
    api: Arc<JsonApi<A>>,
    config: Arc<ServerConfig>,
}

// Manual impl: `A` itself does not need to be Clone.
impl<A: Adapter> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: Arc::clone(&self.config),
        }
    }
}

impl<A: Adapter> AppState<A> {
    /// Creates a new state.
    pub fn new(api: Arc<JsonApi<A>>, config: ServerConfig) -> Self {
        Self {
            api,
            config: Arc::new(config),
        }
    }

    /// Returns the resource registry.
    pub fn api(&self) -> &JsonApi<A> {
        &self.api
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
