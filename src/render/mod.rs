//! Drawing scenes with OpenGL.

pub mod helpers;
pub mod lights;
pub mod renderer;

pub use renderer::*;
