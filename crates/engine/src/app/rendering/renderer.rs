use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{SceneWorld, Sprite, TextAlign, TextItem, TileShape, Tilemap, UiElement};

use super::raster::{self, Canvas, ScreenRect};
use super::text::{draw_text, text_width_px};
use super::transform::{visible_tile_range, world_rect_to_screen, Viewport};

const MISSING_STYLE_COLOR: [u8; 4] = [255, 0, 255, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// PNG sprites loaded on first use from `<sprites_dir>/<key>.png`. Failed
/// loads are cached as `None` and warned about once.
struct SpriteCache {
    sprites_dir: PathBuf,
    entries: HashMap<String, Option<LoadedSprite>>,
    warned_keys: HashSet<String>,
}

impl SpriteCache {
    fn new(sprites_dir: PathBuf) -> Self {
        Self {
            sprites_dir,
            entries: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    fn resolve(&mut self, key: &str) -> Option<&LoadedSprite> {
        if !self.entries.contains_key(key) {
            let loaded = match sprite_path(&self.sprites_dir, key) {
                Some(path) => match load_sprite_rgba(&path) {
                    Ok(sprite) => Some(sprite),
                    Err(reason) => {
                        self.warn_once(key, Some(&path), &reason);
                        None
                    }
                },
                None => {
                    self.warn_once(key, None, "invalid_key");
                    None
                }
            };
            self.entries.insert(key.to_string(), loaded);
        }
        self.entries.get(key).and_then(Option::as_ref)
    }

    fn warn_once(&mut self, key: &str, path: Option<&Path>, reason: &str) {
        if !self.warned_keys.insert(key.to_string()) {
            return;
        }
        let path_display = path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unresolved>".to_string());
        warn!(
            sprite_key = key,
            path = %path_display,
            reason,
            "renderer_sprite_load_failed_using_fallback"
        );
    }
}

fn is_valid_sprite_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.contains("..")
        && key
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-'))
}

fn sprite_path(sprites_dir: &Path, key: &str) -> Option<PathBuf> {
    is_valid_sprite_key(key).then(|| sprites_dir.join(format!("{key}.png")))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    if !path.is_file() {
        return Err("file_missing".to_string());
    }
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Fixed-resolution software renderer. The frame buffer always has the
/// logical size given at construction; `pixels` scales it to the surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    sprites: SpriteCache,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        logical_width: u32,
        logical_height: u32,
        sprites_dir: PathBuf,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let viewport = Viewport {
            width: logical_width,
            height: logical_height,
        };
        let pixels = Self::build_pixels(Arc::clone(&window), viewport, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport,
            sprites: SpriteCache::new(sprites_dir),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), self.viewport, width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        viewport: Viewport,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width.max(1), surface_height.max(1), window);
        Pixels::new(viewport.width, viewport.height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let canvas = Canvas {
            width: self.viewport.width,
            height: self.viewport.height,
        };
        compose_frame(self.pixels.frame_mut(), canvas, world, &mut self.sprites);
        self.pixels.render()
    }
}

fn compose_frame(frame: &mut [u8], canvas: Canvas, world: &SceneWorld, sprites: &mut SpriteCache) {
    raster::clear(frame, world.clear_color());
    if world.show_world() {
        if let Some(tilemap) = world.tilemap() {
            draw_tilemap(frame, canvas, world, tilemap, sprites);
        }
        for sprite in world.sprites().iter().filter(|sprite| sprite.visible) {
            draw_sprite(frame, canvas, world, sprite, sprites);
        }
    }
    for element in world.ui_elements() {
        match element {
            UiElement::Panel(panel) => raster::fill_rect(
                frame,
                canvas,
                ScreenRect {
                    x: panel.x,
                    y: panel.y,
                    width: panel.width,
                    height: panel.height,
                },
                panel.color,
            ),
            UiElement::Text(text) => draw_text_item(frame, canvas, text),
        }
    }
}

fn draw_tilemap(
    frame: &mut [u8],
    canvas: Canvas,
    world: &SceneWorld,
    tilemap: &Tilemap,
    sprites: &mut SpriteCache,
) {
    let viewport = Viewport {
        width: canvas.width,
        height: canvas.height,
    };
    let Some(range) = visible_tile_range(tilemap, world.camera(), viewport) else {
        return;
    };

    for y in range.y_min..=range.y_max {
        for x in range.x_min..=range.x_max {
            let Some(tile_id) = tilemap.tile_at(x, y) else {
                continue;
            };
            let rect = world_rect_to_screen(tilemap.tile_rect(x, y), world.camera());
            let Some(style) = world.tile_style(tile_id) else {
                raster::fill_rect(frame, canvas, rect, MISSING_STYLE_COLOR);
                continue;
            };
            if let Some(sprite) = style.sprite_key.and_then(|key| sprites.resolve(key)) {
                raster::blit_scaled(frame, canvas, rect, sprite.width, sprite.height, &sprite.rgba);
                continue;
            }
            match style.shape {
                TileShape::Empty => {}
                TileShape::Filled => raster::fill_rect(frame, canvas, rect, style.color),
                TileShape::Ellipse => raster::fill_ellipse(frame, canvas, rect, style.color),
            }
        }
    }
}

fn draw_sprite(
    frame: &mut [u8],
    canvas: Canvas,
    world: &SceneWorld,
    sprite: &Sprite,
    sprites: &mut SpriteCache,
) {
    let rect = world_rect_to_screen(sprite.rect, world.camera());
    if let Some(image) = sprite.sprite_key.and_then(|key| sprites.resolve(key)) {
        raster::blit_scaled(frame, canvas, rect, image.width, image.height, &image.rgba);
        return;
    }
    raster::fill_rect(frame, canvas, rect, sprite.color);
}

fn draw_text_item(frame: &mut [u8], canvas: Canvas, item: &TextItem) {
    let x = match item.align {
        TextAlign::Left => item.x,
        TextAlign::Center => item.x - text_width_px(&item.text, item.scale) / 2,
    };
    draw_text(frame, canvas, (x, item.y), &item.text, item.color, item.scale);
}
