use engine::Rect;

use super::body::Body;
use super::tiles::{cell_index, TileMap};
use super::TILE_SIZE;
use crate::app::config::GameRules;

pub(crate) const ENEMY_SIZE: f32 = TILE_SIZE - 4.0;
pub(crate) const ENEMY_SPEED: f32 = 2.0;
const STOMP_TOLERANCE: f32 = 10.0;

/// Ground patroller. It ignores gravity and turns around at walls, and at
/// ledges too when ledge turning is enabled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) body: Body,
    pub(crate) direction: f32,
}

impl Enemy {
    pub(crate) fn spawn(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
            direction: 1.0,
        }
    }

    pub(crate) fn update(&mut self, map: &TileMap, rules: &GameRules) {
        self.body.vx = ENEMY_SPEED * self.direction;
        self.body.rect.x += self.body.vx;

        let rect = self.body.rect;
        let leading_col = if self.direction > 0.0 {
            cell_index(rect.right())
        } else {
            cell_index(rect.left())
        };
        let center_row = cell_index(rect.center().y);
        let hits_wall = map.solid_at(leading_col, center_row, rules.door_mode);
        let at_ledge = rules.ledge_turn && {
            let row_below = (rect.bottom() / TILE_SIZE).ceil() as i32;
            !map.solid_at(leading_col, row_below, rules.door_mode)
        };
        if hits_wall || at_ledge {
            self.direction = -self.direction;
        }
    }

    /// A stomp is a downward-moving player whose feet are still above the
    /// enemy's middle (plus a small tolerance) when the boxes overlap.
    pub(crate) fn is_stomped_by(&self, player: &Rect, player_vy: f32) -> bool {
        player_vy > 0.0 && player.bottom() < self.body.rect.center().y + STOMP_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    // Floor on row 3, a wall at col 6, and a pit at cols 2..=3.
    fn patrol_map() -> TileMap {
        TileMap::parse(
            Path::new("patrol.txt"),
            "1000001\n1000001\n1000001\n1100111",
        )
        .expect("map")
    }

    fn enemy_on_floor(x: f32) -> Enemy {
        Enemy::spawn(x, 2.0 * TILE_SIZE)
    }

    #[test]
    fn patrols_two_pixels_per_tick() {
        let map = patrol_map();
        let mut enemy = enemy_on_floor(160.0);
        enemy.update(&map, &GameRules::default());
        assert_eq!(enemy.body.rect.x, 162.0);
        assert_eq!(enemy.direction, 1.0);
    }

    #[test]
    fn reverses_at_wall() {
        let map = patrol_map();
        let mut enemy = enemy_on_floor(200.0);
        let mut ticks = 0;
        while enemy.direction > 0.0 {
            enemy.update(&map, &GameRules::default());
            ticks += 1;
            assert!(ticks < 100, "never turned");
        }
        assert!(enemy.body.rect.right() >= 240.0);

        enemy.update(&map, &GameRules::default());
        assert_eq!(enemy.direction, -1.0);
        assert!(enemy.body.rect.right() < 242.0);
    }

    #[test]
    fn walks_off_ledges_unless_ledge_turn_enabled() {
        let map = patrol_map();
        let mut wall_only = enemy_on_floor(162.0);
        wall_only.direction = -1.0;
        for _ in 0..5 {
            wall_only.update(&map, &GameRules::default());
        }
        assert_eq!(wall_only.direction, -1.0);

        let ledge_rules = GameRules {
            ledge_turn: true,
            ..GameRules::default()
        };
        let mut cautious = enemy_on_floor(162.0);
        cautious.direction = -1.0;
        for _ in 0..5 {
            cautious.update(&map, &ledge_rules);
        }
        assert_eq!(cautious.direction, 1.0);
    }

    #[test]
    fn stomp_requires_falling_and_feet_above_center() {
        let enemy = enemy_on_floor(160.0);
        let center_y = enemy.body.rect.center().y;
        let high = Rect::new(160.0, center_y + 5.0 - 76.0, 36.0, 76.0);
        let low = Rect::new(160.0, center_y + 12.0 - 76.0, 36.0, 76.0);

        assert!(enemy.is_stomped_by(&high, 3.0));
        assert!(!enemy.is_stomped_by(&high, 0.0));
        assert!(!enemy.is_stomped_by(&high, -3.0));
        assert!(!enemy.is_stomped_by(&low, 3.0));
    }
}
