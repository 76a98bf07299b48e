use crate::app::{Camera2D, Rect, Tilemap, Vec2};

use super::raster::ScreenRect;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub fn world_to_screen(world: Vec2, camera: &Camera2D) -> Vec2 {
    Vec2 {
        x: world.x - camera.offset.x,
        y: world.y - camera.offset.y,
    }
}

/// Snaps a world rectangle to whole screen pixels. The offset is floored
/// before subtracting so that adjacent tiles never leave seams.
pub(crate) fn world_rect_to_screen(rect: Rect, camera: &Camera2D) -> ScreenRect {
    let origin = world_to_screen(Vec2::new(rect.x, rect.y), camera);
    let left = origin.x.floor() as i32;
    let top = origin.y.floor() as i32;
    let right = (origin.x + rect.w).floor() as i32;
    let bottom = (origin.y + rect.h).floor() as i32;
    ScreenRect {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileRange {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

pub(crate) fn visible_tile_range(
    tilemap: &Tilemap,
    camera: &Camera2D,
    viewport: Viewport,
) -> Option<TileRange> {
    if tilemap.width() == 0 || tilemap.height() == 0 || tilemap.tile_size() <= 0.0 {
        return None;
    }
    let size = tilemap.tile_size();
    let raw_x_min = (camera.offset.x / size).floor() as i64;
    let raw_x_max = ((camera.offset.x + viewport.width as f32) / size).ceil() as i64 - 1;
    let raw_y_min = (camera.offset.y / size).floor() as i64;
    let raw_y_max = ((camera.offset.y + viewport.height as f32) / size).ceil() as i64 - 1;

    let x_min = raw_x_min.max(0);
    let x_max = raw_x_max.min(tilemap.width() as i64 - 1);
    let y_min = raw_y_min.max(0);
    let y_max = raw_y_max.min(tilemap.height() as i64 - 1);
    if x_min > x_max || y_min > y_max {
        return None;
    }

    Some(TileRange {
        x_min: x_min as u32,
        x_max: x_max as u32,
        y_min: y_min as u32,
        y_max: y_max as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    fn camera_at(x: f32, y: f32) -> Camera2D {
        Camera2D {
            offset: Vec2::new(x, y),
        }
    }

    #[test]
    fn camera_offset_shifts_screen_position() {
        let camera = camera_at(100.0, -20.0);
        let screen = world_to_screen(Vec2::new(120.0, 0.0), &camera);
        assert_eq!(screen, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn fractional_offset_keeps_adjacent_tiles_seamless() {
        let camera = camera_at(10.4, 0.0);
        let first = world_rect_to_screen(Rect::new(0.0, 0.0, 40.0, 40.0), &camera);
        let second = world_rect_to_screen(Rect::new(40.0, 0.0, 40.0, 40.0), &camera);
        assert_eq!(first.x + first.width, second.x);
    }

    #[test]
    fn visible_range_is_clamped_to_map() {
        let tilemap = Tilemap::new(30, 9, 40.0, vec![0; 270]).expect("tilemap");
        let range = visible_tile_range(&tilemap, &camera_at(-100.0, -100.0), VIEWPORT)
            .expect("visible");
        assert_eq!(
            range,
            TileRange {
                x_min: 0,
                x_max: 17,
                y_min: 0,
                y_max: 8,
            }
        );
    }

    #[test]
    fn camera_past_map_sees_nothing() {
        let tilemap = Tilemap::new(4, 4, 40.0, vec![0; 16]).expect("tilemap");
        assert!(visible_tile_range(&tilemap, &camera_at(1000.0, 0.0), VIEWPORT).is_none());
    }
}
