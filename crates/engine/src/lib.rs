use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;

pub use app::{
    run_app, text_height_px, text_width_px, world_to_screen, AppError, Camera2D,
    InputAction, InputEdge, InputSnapshot, LoopConfig, LoopMetricsSnapshot, Panel, Rect,
    Renderer, Scene, SceneWorld, Sprite, TextAlign, TextItem, TileShape, TileStyle, Tilemap,
    TilemapError, UiElement, Vec2, SLOW_FRAME_ENV_VAR,
};
pub use content::{
    compile_stage_defs, compile_stage_defs_str, ContentCompileError, ContentErrorCode,
    SourceLocation, StageDef, TileCoord,
};

pub const ROOT_ENV_VAR: &str = "KEYQUEST_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub maps_dir: PathBuf,
    pub sprites_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        Self {
            maps_dir: assets_dir.join("maps"),
            sprites_dir: assets_dir.join("sprites"),
            assets_dir,
            root,
        }
    }

    pub fn stage_table_path(&self) -> PathBuf {
        self.assets_dir.join("stages.xml")
    }

    pub fn config_path(&self) -> PathBuf {
        self.assets_dir.join("config.json")
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "KEYQUEST_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/key-quest\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_repo_marker(&cwd.join("definitely_not_a_marker")));
    }

    #[test]
    fn repo_marker_accepts_cargo_toml_with_assets() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("write");
        assert!(!is_repo_marker(dir.path()));

        fs::create_dir(dir.path().join("assets")).expect("mkdir");
        assert!(is_repo_marker(dir.path()));
    }

    #[test]
    fn app_paths_derive_asset_locations_from_root() {
        let paths = AppPaths::from_root(PathBuf::from("/game"));
        assert_eq!(paths.maps_dir, PathBuf::from("/game/assets/maps"));
        assert_eq!(paths.sprites_dir, PathBuf::from("/game/assets/sprites"));
        assert_eq!(
            paths.stage_table_path(),
            PathBuf::from("/game/assets/stages.xml")
        );
        assert_eq!(
            paths.config_path(),
            PathBuf::from("/game/assets/config.json")
        );
    }
}
