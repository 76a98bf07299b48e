use std::path::Path;

use engine::{compile_stage_defs, AppPaths, ContentCompileError, StageDef, TileCoord, Vec2};
use thiserror::Error;
use tracing::{info, warn};

use super::tiles::{MapError, TileMap};
use super::TILE_SIZE;

#[derive(Debug, Error)]
pub(crate) enum StageLoadError {
    #[error("invalid stage table: {0}")]
    Table(#[from] ContentCompileError),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// A stage ready to start: the pristine map plus spawn points in pixels.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StageSpec {
    pub(crate) map_name: String,
    pub(crate) map: TileMap,
    pub(crate) spawn: Vec2,
    pub(crate) enemies: Vec<Vec2>,
}

/// The fixed stage roster, in play order.
#[derive(Debug, Clone)]
pub(crate) struct StageCatalog {
    stages: Vec<StageSpec>,
}

fn coord(col: u32, row: u32) -> TileCoord {
    TileCoord { col, row }
}

pub(crate) fn builtin_stage_defs() -> Vec<StageDef> {
    vec![
        StageDef {
            number: 1,
            map_file: "map.txt".to_string(),
            spawn: coord(2, 5),
            enemies: vec![coord(15, 7)],
        },
        StageDef {
            number: 2,
            map_file: "map2.txt".to_string(),
            spawn: coord(2, 4),
            enemies: vec![coord(10, 7), coord(25, 7)],
        },
    ]
}

fn to_pixels(coord: TileCoord) -> Vec2 {
    Vec2::new(coord.col as f32 * TILE_SIZE, coord.row as f32 * TILE_SIZE)
}

impl StageCatalog {
    /// Uses `stages.xml` when present, otherwise the built-in roster. Every
    /// map is read and validated here so that bad content fails at startup.
    pub(crate) fn load(paths: &AppPaths) -> Result<Self, StageLoadError> {
        let table_path = paths.stage_table_path();
        let defs = if table_path.is_file() {
            let defs = compile_stage_defs(&table_path)?;
            info!(path = %table_path.display(), stage_count = defs.len(), "stage_table_loaded");
            defs
        } else {
            info!(path = %table_path.display(), "stage_table_missing_using_builtin");
            builtin_stage_defs()
        };
        Self::from_defs(&paths.maps_dir, defs)
    }

    pub(crate) fn from_defs(maps_dir: &Path, defs: Vec<StageDef>) -> Result<Self, StageLoadError> {
        let mut stages = Vec::with_capacity(defs.len());
        for def in defs {
            let map = TileMap::load(&maps_dir.join(&def.map_file))?;
            if def.spawn.col as usize >= map.width() || def.spawn.row as usize >= map.height() {
                warn!(
                    stage = def.number,
                    map = def.map_file.as_str(),
                    col = def.spawn.col,
                    row = def.spawn.row,
                    "stage_spawn_outside_map"
                );
            }
            stages.push(StageSpec {
                map_name: def.map_file,
                map,
                spawn: to_pixels(def.spawn),
                enemies: def.enemies.into_iter().map(to_pixels).collect(),
            });
        }
        Ok(Self { stages })
    }

    #[cfg(test)]
    pub(crate) fn from_stages(stages: Vec<StageSpec>) -> Self {
        Self { stages }
    }

    pub(crate) fn len(&self) -> usize {
        self.stages.len()
    }

    /// Stage numbers are 1-based and contiguous, so they index the roster.
    pub(crate) fn get(&self, number: u32) -> Option<&StageSpec> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.stages.get(index)
    }
}
