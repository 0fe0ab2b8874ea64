use std::sync::Arc;
use warmup_core::{Config, ProfileStore, RunController, SanitizedConfig, StatusStore};

/// Shared application state
pub struct AppState {
    config: Config,
    profiles: Arc<dyn ProfileStore>,
    runner: Arc<dyn RunController>,
}

impl AppState {
    pub fn new(
        config: Config,
        profiles: Arc<dyn ProfileStore>,
        runner: Arc<dyn RunController>,
    ) -> Self {
        Self {
            config,
            profiles,
            runner,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    pub fn runner(&self) -> &dyn RunController {
        self.runner.as_ref()
    }

    /// Status store of the active runner.
    pub fn status(&self) -> &StatusStore {
        self.runner.status().as_ref()
    }
}
