use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// How the door tile `D` and the goal interact with the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DoorMode {
    /// `D` is solid; using the key item from the menu near a door turns it into `G`.
    #[default]
    MenuKey,
    /// `D` is inert; the goal only clears the stage once the key is held.
    KeyAtGoal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameRules {
    pub(crate) door_mode: DoorMode,
    pub(crate) knockback: bool,
    pub(crate) ledge_turn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PhysicsTuning {
    pub(crate) gravity: f32,
    pub(crate) jump_strength: f32,
    pub(crate) move_speed: f32,
    pub(crate) max_fall_speed: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.9,
            jump_strength: -15.0,
            move_speed: 5.0,
            max_fall_speed: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) rules: GameRules,
    pub(crate) physics: PhysicsTuning,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Loads `config.json`. A missing file means every default applies.
pub(crate) fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config_missing_using_defaults");
            return Ok(GameConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_game_config(&raw).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    validate_physics(&config.physics).map_err(|message| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}

fn parse_game_config(raw: &str) -> Result<GameConfig, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let source = error.into_inner();
        if path.is_empty() || path == "." {
            source.to_string()
        } else {
            format!("at {path}: {source}")
        }
    })
}

fn validate_physics(physics: &PhysicsTuning) -> Result<(), String> {
    let checks = [
        ("physics.gravity", physics.gravity, physics.gravity > 0.0),
        (
            "physics.jump_strength",
            physics.jump_strength,
            physics.jump_strength < 0.0,
        ),
        ("physics.move_speed", physics.move_speed, physics.move_speed > 0.0),
        (
            "physics.max_fall_speed",
            physics.max_fall_speed,
            physics.max_fall_speed > 0.0,
        ),
    ];
    for (name, value, in_range) in checks {
        if !value.is_finite() || !in_range {
            return Err(format!("{name} is out of range: {value}"));
        }
    }
    Ok(())
}
