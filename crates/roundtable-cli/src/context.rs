use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use roundtable_application::DiscussionUseCase;
use roundtable_core::config::RoundtableConfig;
use roundtable_infrastructure::{
    ConfigService, RoundtablePaths, TomlCharacterRepository, TomlDiscussionRepository,
};
use roundtable_interaction::ProviderRouter;

/// Everything the commands need, wired once at startup.
pub struct AppContext {
    pub paths: RoundtablePaths,
    pub config_service: ConfigService,
    pub config: RoundtableConfig,
    pub router: Arc<ProviderRouter>,
    pub usecase: DiscussionUseCase,
}

impl AppContext {
    pub fn load(paths: RoundtablePaths, config_path: Option<PathBuf>) -> Result<Self> {
        let config_service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(&paths),
        };
        let config = config_service.get_config();

        let discussions = Arc::new(
            TomlDiscussionRepository::from_paths(&paths)
                .context("Failed to open the discussions directory")?,
        );
        let characters = Arc::new(TomlCharacterRepository::from_paths(&paths));
        let router = Arc::new(ProviderRouter::new());
        let usecase = DiscussionUseCase::new(
            discussions,
            characters,
            router.clone(),
            config.clone(),
        );

        Ok(Self {
            paths,
            config_service,
            config,
            router,
            usecase,
        })
    }
}
