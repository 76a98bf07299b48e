use thiserror::Error;

use super::input::{ActionStates, EdgeStates, InputAction, InputEdge};

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    edges: EdgeStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates, edges: EdgeStates) -> Self {
        Self {
            quit_requested,
            actions,
            edges,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn was_pressed(&self, edge: InputEdge) -> bool {
        self.edges.was_pressed(edge)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_pressed(mut self, edge: InputEdge, pressed: bool) -> Self {
        self.edges = self.edges.with_pressed(edge, pressed);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in world pixels, y pointing down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w * 0.5,
            y: self.y + self.h * 0.5,
        }
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// Scroll offset: the world position shown at the top-left of the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub offset: Vec2,
}

/// Render-side grid of tile ids. Styles are looked up per id in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_size: f32,
        tiles: Vec<u16>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u16> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn set_tile(&mut self, x: u32, y: u32, tile: u16) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    pub fn tile_rect(&self, x: u32, y: u32) -> Rect {
        Rect::new(
            x as f32 * self.tile_size,
            y as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileShape {
    Empty,
    Filled,
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStyle {
    pub shape: TileShape,
    pub color: [u8; 4],
    pub sprite_key: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub rect: Rect,
    pub color: [u8; 4],
    pub visible: bool,
    pub sprite_key: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Screen-space text. `scale` multiplies the 3x5 glyph cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub align: TextAlign,
    pub color: [u8; 4],
    pub scale: i32,
}

/// Screen-space filled rectangle, alpha-blended over what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiElement {
    Panel(Panel),
    Text(TextItem),
}

/// Everything the renderer draws for one frame. Scenes rebuild the per-frame
/// parts (sprites, ui) every tick; the tilemap persists until replaced.
#[derive(Debug)]
pub struct SceneWorld {
    clear_color: [u8; 4],
    show_world: bool,
    camera: Camera2D,
    tilemap: Option<Tilemap>,
    tile_styles: Vec<Option<TileStyle>>,
    sprites: Vec<Sprite>,
    ui: Vec<UiElement>,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self {
            clear_color: [255, 255, 255, 255],
            show_world: true,
            camera: Camera2D::default(),
            tilemap: None,
            tile_styles: Vec::new(),
            sprites: Vec::new(),
            ui: Vec::new(),
        }
    }
}

impl SceneWorld {
    pub fn begin_frame(&mut self) {
        self.sprites.clear();
        self.ui.clear();
    }

    pub fn clear(&mut self) {
        self.begin_frame();
        self.camera = Camera2D::default();
        self.tilemap = None;
        self.show_world = true;
    }

    pub fn set_clear_color(&mut self, color: [u8; 4]) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> [u8; 4] {
        self.clear_color
    }

    pub fn set_show_world(&mut self, show_world: bool) {
        self.show_world = show_world;
    }

    pub fn show_world(&self) -> bool {
        self.show_world
    }

    pub fn set_tilemap(&mut self, tilemap: Tilemap) {
        self.tilemap = Some(tilemap);
    }

    pub fn clear_tilemap(&mut self) {
        self.tilemap = None;
    }

    pub fn tilemap(&self) -> Option<&Tilemap> {
        self.tilemap.as_ref()
    }

    pub fn tilemap_mut(&mut self) -> Option<&mut Tilemap> {
        self.tilemap.as_mut()
    }

    pub fn set_tile_style(&mut self, tile: u16, style: TileStyle) {
        let index = tile as usize;
        if self.tile_styles.len() <= index {
            self.tile_styles.resize(index + 1, None);
        }
        self.tile_styles[index] = Some(style);
    }

    pub fn tile_style(&self, tile: u16) -> Option<&TileStyle> {
        self.tile_styles.get(tile as usize).and_then(Option::as_ref)
    }

    pub fn push_sprite(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn push_panel(&mut self, panel: Panel) {
        self.ui.push(UiElement::Panel(panel));
    }

    pub fn push_text(&mut self, text: TextItem) {
        self.ui.push(UiElement::Text(text));
    }

    pub fn ui_elements(&self) -> &[UiElement] {
        &self.ui
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
}
