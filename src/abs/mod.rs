//! This module contains the thin wrappers over SDL2 and OpenGL,
//! including application setup, shader management, meshes, textures and framebuffers.

pub mod app;
pub mod framebuffer;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
pub use framebuffer::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
