mod body;
mod enemy;
mod player;
mod scene_impl;
mod session;
mod stage;
mod tiles;


use engine::Scene;

use super::config::GameConfig;

pub(crate) use stage::{StageCatalog, StageLoadError};

pub(crate) const TILE_SIZE: f32 = 40.0;
pub(crate) const SCREEN_WIDTH: f32 = 800.0;
pub(crate) const SCREEN_HEIGHT: f32 = 600.0;

pub(crate) fn build_scene(catalog: StageCatalog, config: GameConfig) -> Box<dyn Scene> {
    Box::new(scene_impl::KeyQuestScene::new(session::Session::new(
        catalog, config,
    )))
}
