//! Shared service state with atomically swappable layers.

use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use tracing::info;

use gridfinder::config::Config;
use gridfinder::{AssignmentResolver, LayerSet};

/// Application state shared across handlers
pub struct AppState {
    config: Config,
    resolver: AssignmentResolver,
    layers: RwLock<Arc<LayerSet>>,
}

impl AppState {
    pub fn new(config: Config, layers: LayerSet) -> Self {
        let resolver = AssignmentResolver::new(config.resolver_options());
        Self {
            config,
            resolver,
            layers: RwLock::new(Arc::new(layers)),
        }
    }

    pub fn resolver(&self) -> &AssignmentResolver {
        &self.resolver
    }

    /// Current layer snapshot. Callers keep using it even if a reload lands meanwhile.
    pub fn layers(&self) -> Result<Arc<LayerSet>> {
        self.layers
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| anyhow!("layer lock poisoned"))
    }

    /// Re-read every layer from disk and swap them in together.
    ///
    /// On failure the previous layers stay in place.
    pub async fn reload(self: &Arc<Self>) -> Result<Arc<LayerSet>> {
        let state = Arc::clone(self);
        let fresh = tokio::task::spawn_blocking(move || state.config.load_layers()).await??;
        let fresh = Arc::new(fresh);

        let mut guard = self
            .layers
            .write()
            .map_err(|_| anyhow!("layer lock poisoned"))?;
        *guard = Arc::clone(&fresh);
        info!("Layers reloaded");
        Ok(fresh)
    }
}
