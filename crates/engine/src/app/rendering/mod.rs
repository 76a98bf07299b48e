mod raster;
mod renderer;
mod text;
mod transform;

pub use renderer::Renderer;
pub use text::{text_height_px, text_width_px};
pub use transform::world_to_screen;
