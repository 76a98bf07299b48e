use std::path::PathBuf;

use engine::{resolve_app_paths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_game_config, ConfigError};
use super::gameplay::{self, StageCatalog, StageLoadError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) sprites_dir: PathBuf,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stages(#[from] StageLoadError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Key Quest Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets_dir = %paths.assets_dir.display(),
        "startup"
    );

    let game_config = load_game_config(&paths.config_path())?;
    info!(
        door_mode = ?game_config.rules.door_mode,
        knockback = game_config.rules.knockback,
        ledge_turn = game_config.rules.ledge_turn,
        "game_rules"
    );

    let catalog = StageCatalog::load(&paths)?;
    info!(stage_count = catalog.len(), "stage_catalog_loaded");

    Ok(AppWiring {
        config: LoopConfig::default(),
        sprites_dir: paths.sprites_dir.clone(),
        scene: gameplay::build_scene(catalog, game_config),
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
