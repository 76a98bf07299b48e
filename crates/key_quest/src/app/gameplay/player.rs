use engine::Vec2;

use super::body::Body;
use super::tiles::TileMap;
use super::TILE_SIZE;
use crate::app::config::{GameRules, PhysicsTuning};

pub(crate) const PLAYER_WIDTH: f32 = TILE_SIZE - 4.0;
pub(crate) const PLAYER_HEIGHT: f32 = TILE_SIZE * 2.0 - 4.0;
pub(crate) const START_HEALTH: u32 = 3;
pub(crate) const MAX_HEALTH: u32 = 5;
pub(crate) const INVULNERABLE_TICKS: u32 = 60;
const BLINK_PERIOD_TICKS: u32 = 8;
const KNOCKBACK_RISE: f32 = -8.0;
const KNOCKBACK_PUSH: f32 = 6.0;
const KNOCKBACK_DECAY: f32 = 0.8;
const KNOCKBACK_EPSILON: f32 = 0.1;

/// Movement requested by input for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MoveIntent {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) jump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// Still invulnerable from an earlier hit.
    Ignored,
    Hurt,
    Defeated,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    pub(crate) body: Body,
    pub(crate) health: u32,
    pub(crate) invulnerable_ticks: u32,
    pub(crate) has_key: bool,
    pub(crate) intent: MoveIntent,
    knockback_vx: f32,
}

impl Player {
    pub(crate) fn spawn(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT),
            health: START_HEALTH,
            invulnerable_ticks: 0,
            has_key: false,
            intent: MoveIntent::default(),
            knockback_vx: 0.0,
        }
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.body.rect.center()
    }

    /// One Running tick: horizontal pass, jump, vertical pass, then the
    /// invulnerability countdown.
    pub(crate) fn update(&mut self, map: &TileMap, rules: &GameRules, physics: &PhysicsTuning) {
        let walk = if self.intent.left {
            -physics.move_speed
        } else if self.intent.right {
            physics.move_speed
        } else {
            0.0
        };
        self.body.vx = walk + self.knockback_vx;
        self.decay_knockback();
        self.body.step_horizontal(map, rules.door_mode);

        if self.intent.jump {
            self.body.jump(physics.jump_strength);
        }
        self.body.step_vertical(map, rules.door_mode, physics);

        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
    }

    fn decay_knockback(&mut self) {
        self.knockback_vx *= KNOCKBACK_DECAY;
        if self.knockback_vx.abs() < KNOCKBACK_EPSILON {
            self.knockback_vx = 0.0;
        }
    }

    /// Applies one point of damage unless invulnerable. With knockback the
    /// player is thrown up and away from `source_x`.
    pub(crate) fn take_damage(&mut self, source_x: f32, knockback: bool) -> DamageOutcome {
        if self.invulnerable_ticks > 0 {
            return DamageOutcome::Ignored;
        }
        self.health = self.health.saturating_sub(1);
        self.invulnerable_ticks = INVULNERABLE_TICKS;
        if knockback {
            self.body.vy = KNOCKBACK_RISE;
            self.body.grounded = false;
            self.knockback_vx = if self.center().x < source_x {
                -KNOCKBACK_PUSH
            } else {
                KNOCKBACK_PUSH
            };
        }
        if self.health == 0 {
            DamageOutcome::Defeated
        } else {
            DamageOutcome::Hurt
        }
    }

    pub(crate) fn heal(&mut self) {
        self.health = (self.health + 1).min(MAX_HEALTH);
    }

    pub(crate) fn bounce(&mut self, jump_strength: f32) {
        self.body.vy = jump_strength * 0.6;
    }

    /// Blinks while invulnerable.
    pub(crate) fn is_visible(&self) -> bool {
        self.invulnerable_ticks == 0 || self.invulnerable_ticks % BLINK_PERIOD_TICKS < BLINK_PERIOD_TICKS / 2
    }

    #[cfg(test)]
    pub(crate) fn knockback_vx(&self) -> f32 {
        self.knockback_vx
    }
}
