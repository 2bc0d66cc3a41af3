//! Application state: the data store, badge policy and level table.
//!
//! This module owns:
//!   - the backend choice (hosted REST store, or the seeded in-memory store)
//!   - the badge policy from configuration
//!   - the level table (from TOML or defaults)
//!
//! If no backend URL is configured we fall back to the built-in demo catalog.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::backend::RestStore;
use crate::config::{BadgePolicy, DashboardConfig};
use crate::levels::Level;
use crate::seeds::seeded_memory_store;
use crate::session::SessionContext;
use crate::store::{DataStore, MemoryStore};

#[derive(Clone)]
pub enum Backend {
    Rest(RestStore),
    Memory(Arc<MemoryStore>),
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub policy: BadgePolicy,
    pub levels: Vec<Level>,
}

impl AppState {
    /// Build state from env: load config, pick the backend, seed the demo store if needed.
    #[instrument(level = "info", skip_all)]
    pub async fn new() -> Self {
        Self::from_config(DashboardConfig::from_env()).await
    }

    pub async fn from_config(cfg: DashboardConfig) -> Self {
        let levels = cfg.level_table();
        let backend = match RestStore::from_config(&cfg.backend) {
            Some(rest) => {
                info!(target: "dashboard", base_url = %rest.base_url, timeout_secs = cfg.backend.timeout_secs, "Hosted backend enabled.");
                Backend::Rest(rest)
            }
            None => {
                warn!(target: "dashboard", "BACKEND_URL not set; serving the in-memory demo catalog.");
                Backend::Memory(Arc::new(seeded_memory_store().await))
            }
        };

        info!(target: "dashboard", levels = levels.len(), vacuous_paths_complete = cfg.badges.vacuous_paths_complete, "Startup configuration");

        Self { backend, policy: cfg.badges, levels }
    }

    #[cfg(test)]
    pub fn with_memory_store(store: MemoryStore, policy: BadgePolicy, levels: Vec<Level>) -> Self {
        Self { backend: Backend::Memory(Arc::new(store)), policy, levels }
    }

    /// Store scoped to the caller. REST requests run with the user's token when present.
    #[instrument(level = "debug", skip(self, session), fields(user_id = %session.user_id))]
    pub fn store_for(&self, session: &SessionContext) -> Arc<dyn DataStore> {
        match &self.backend {
            Backend::Rest(rest) => {
                let scoped = match &session.access_token {
                    Some(token) => rest.with_access_token(token),
                    None => rest.clone(),
                };
                Arc::new(scoped) as Arc<dyn DataStore>
            }
            Backend::Memory(mem) => mem.clone() as Arc<dyn DataStore>,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendCfg;

    #[tokio::test]
    async fn no_backend_url_serves_demo_catalog() {
        let state = AppState::from_config(DashboardConfig::default()).await;
        assert!(matches!(state.backend, Backend::Memory(_)));
        let session = SessionContext { user_id: "demo".into(), access_token: None };
        let paths = state.store_for(&session).list_learning_paths().await.unwrap();
        assert_eq!(paths.len(), 3);
    }

    #[tokio::test]
    async fn backend_url_selects_rest_store() {
        let cfg = DashboardConfig {
            backend: BackendCfg { url: Some("https://db.example.co".into()), timeout_secs: 2, ..Default::default() },
            ..Default::default()
        };
        let state = AppState::from_config(cfg).await;
        assert!(matches!(state.backend, Backend::Rest(_)));
        assert_eq!(state.levels.len(), 8);
    }
}
