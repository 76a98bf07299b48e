mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, InputEdge};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{text_height_px, text_width_px, world_to_screen, Renderer};
pub use scene::{
    Camera2D, InputSnapshot, Panel, Rect, Scene, SceneWorld, Sprite, TextAlign, TextItem,
    TileShape, TileStyle, Tilemap, TilemapError, UiElement, Vec2,
};
