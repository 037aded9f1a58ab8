pub mod data;
pub mod input;
pub mod render;
pub mod render_loop;
pub mod settings;
pub mod shader;
pub mod triangle;

pub use render::Problem;
pub use render_loop::{LoopEvent, LoopState, RenderLoop, Renderer};
pub use settings::Settings;
pub use triangle::Triangle;
