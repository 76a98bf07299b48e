use engine::Rect;

use super::tiles::{cell_index, cell_rect, TileMap};
use crate::app::config::{DoorMode, PhysicsTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Axis-aligned box with a velocity, resolved against the tile grid one axis
/// at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Body {
    pub(crate) rect: Rect,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) grounded: bool,
}

impl Body {
    pub(crate) fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            vx: 0.0,
            vy: 0.0,
            grounded: false,
        }
    }

    /// Applies `vx` and pushes the box out of any solid cell it entered.
    pub(crate) fn step_horizontal(&mut self, map: &TileMap, door_mode: DoorMode) {
        self.rect.x += self.vx;
        self.resolve(map, door_mode, Axis::Horizontal);
    }

    /// Applies gravity (capped at the fall limit), moves by `vy`, and resolves
    /// vertical contacts. Grounded is recomputed on every call.
    pub(crate) fn step_vertical(&mut self, map: &TileMap, door_mode: DoorMode, physics: &PhysicsTuning) {
        self.vy = (self.vy + physics.gravity).min(physics.max_fall_speed);
        self.rect.y += self.vy;
        self.grounded = false;
        self.resolve(map, door_mode, Axis::Vertical);
    }

    /// Jumps only from the ground; returns whether the jump happened.
    pub(crate) fn jump(&mut self, strength: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.vy = strength;
        self.grounded = false;
        true
    }

    fn resolve(&mut self, map: &TileMap, door_mode: DoorMode, axis: Axis) {
        let velocity = match axis {
            Axis::Horizontal => self.vx,
            Axis::Vertical => self.vy,
        };
        let (col_min, col_max) = (cell_index(self.rect.left()), cell_index(self.rect.right()));
        let (row_min, row_max) = (cell_index(self.rect.top()), cell_index(self.rect.bottom()));

        for row in row_min..=row_max {
            for col in col_min..=col_max {
                if !map.solid_at(col, row, door_mode) {
                    continue;
                }
                let tile = cell_rect(col, row);
                if !self.rect.overlaps(&tile) {
                    continue;
                }
                match axis {
                    Axis::Horizontal => {
                        if velocity > 0.0 {
                            self.rect.set_right(tile.left());
                        } else if velocity < 0.0 {
                            self.rect.x = tile.right();
                        }
                        self.vx = 0.0;
                    }
                    Axis::Vertical => {
                        if velocity > 0.0 {
                            self.rect.set_bottom(tile.top());
                            self.grounded = true;
                        } else if velocity < 0.0 {
                            self.rect.y = tile.bottom();
                        }
                        self.vy = 0.0;
                    }
                }
            }
        }
    }

    /// True when the box shares area with any solid cell.
    pub(crate) fn overlaps_solid(&self, map: &TileMap, door_mode: DoorMode) -> bool {
        let (col_min, col_max) = (cell_index(self.rect.left()), cell_index(self.rect.right()));
        let (row_min, row_max) = (cell_index(self.rect.top()), cell_index(self.rect.bottom()));
        (row_min..=row_max).any(|row| {
            (col_min..=col_max).any(|col| {
                map.solid_at(col, row, door_mode) && self.rect.overlaps(&cell_rect(col, row))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    const PHYSICS: PhysicsTuning = PhysicsTuning {
        gravity: 0.9,
        jump_strength: -15.0,
        move_speed: 5.0,
        max_fall_speed: 15.0,
    };

    fn room() -> TileMap {
        TileMap::parse(
            Path::new("room.txt"),
            "11111111\n10000001\n10000001\n10000001\n10000D01\n11111111",
        )
        .expect("map")
    }

    #[test]
    fn falling_body_lands_on_floor_and_is_grounded() {
        let map = room();
        let mut body = Body::new(80.0, 150.0, 36.0, 36.0);
        for _ in 0..40 {
            body.step_vertical(&map, DoorMode::MenuKey, &PHYSICS);
        }
        assert!(body.grounded);
        assert_eq!(body.rect.bottom(), 200.0);
        assert_eq!(body.vy, 0.0);
        assert!(!body.overlaps_solid(&map, DoorMode::MenuKey));
    }

    #[test]
    fn resting_body_is_stable_across_ticks() {
        let map = room();
        let mut body = Body::new(80.0, 164.0, 36.0, 36.0);
        body.step_vertical(&map, DoorMode::MenuKey, &PHYSICS);
        let settled = body;
        for _ in 0..10 {
            body.step_horizontal(&map, DoorMode::MenuKey);
            body.step_vertical(&map, DoorMode::MenuKey, &PHYSICS);
            assert_eq!(body, settled);
        }
    }

    #[test]
    fn walking_into_wall_stops_flush() {
        let map = room();
        let mut body = Body::new(230.0, 124.0, 36.0, 36.0);
        for _ in 0..10 {
            body.vx = 5.0;
            body.step_horizontal(&map, DoorMode::MenuKey);
        }
        assert_eq!(body.rect.right(), 280.0);
        assert_eq!(body.vx, 0.0);

        let mut body = Body::new(50.0, 164.0, 36.0, 36.0);
        body.vx = -20.0;
        body.step_horizontal(&map, DoorMode::MenuKey);
        assert_eq!(body.rect.left(), 40.0);
    }

    #[test]
    fn door_blocks_only_in_menu_key_mode() {
        let map = room();
        let start = Body::new(160.0, 164.0, 36.0, 36.0);

        let mut blocked = start;
        blocked.vx = 10.0;
        blocked.step_horizontal(&map, DoorMode::MenuKey);
        assert_eq!(blocked.rect.right(), 200.0);

        let mut open = start;
        open.vx = 10.0;
        open.step_horizontal(&map, DoorMode::KeyAtGoal);
        assert_eq!(open.rect.x, 170.0);
    }

    #[test]
    fn rising_body_bumps_ceiling() {
        let map = room();
        let mut body = Body::new(80.0, 45.0, 36.0, 36.0);
        body.vy = -14.0;
        body.step_vertical(&map, DoorMode::MenuKey, &PHYSICS);
        assert_eq!(body.rect.top(), 40.0);
        assert_eq!(body.vy, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn fall_speed_is_capped() {
        let map = TileMap::parse(Path::new("open.txt"), "0").expect("map");
        let mut body = Body::new(0.0, 0.0, 10.0, 10.0);
        for _ in 0..50 {
            body.step_vertical(&map, DoorMode::MenuKey, &PHYSICS);
        }
        assert_eq!(body.vy, 15.0);
    }

    #[test]
    fn jump_requires_ground() {
        let mut body = Body::new(0.0, 0.0, 10.0, 10.0);
        assert!(!body.jump(-15.0));
        body.grounded = true;
        assert!(body.jump(-15.0));
        assert_eq!(body.vy, -15.0);
        assert!(!body.grounded);
        assert!(!body.jump(-15.0));
    }
}
