//! Module to work with OpenGL framebuffers.
//!
//! Only depth-only framebuffers are needed, as render targets for shadow maps.

use std::sync::Arc;

use glow::HasContext;

use crate::abs::Texture;

/// Represents an OpenGL framebuffer with a single depth attachment.
pub struct Framebuffer {
    gl: Arc<glow::Context>,
    fbo: glow::Framebuffer,
    depth_tex: Texture,
}

impl Framebuffer {
    /// Creates a square depth-only framebuffer of `size` texels.
    ///
    /// Samples outside the map read as depth 1.0 so that geometry beyond the shadow camera is
    /// lit.
    pub fn depth_only(gl: &Arc<glow::Context>, size: u32) -> Result<Self, String> {
        unsafe {
            let fbo = gl.create_framebuffer()?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));

            let tex = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::DEPTH_COMPONENT24 as i32,
                size as i32,
                size as i32,
                0,
                glow::DEPTH_COMPONENT,
                glow::UNSIGNED_INT,
                glow::PixelUnpackData::Slice(None),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_BORDER as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_BORDER as i32,
            );
            gl.tex_parameter_f32_slice(
                glow::TEXTURE_2D,
                glow::TEXTURE_BORDER_COLOR,
                &[1.0, 1.0, 1.0, 1.0],
            );
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(tex),
                0,
            );
            gl.draw_buffer(glow::NONE);
            gl.read_buffer(glow::NONE);
            gl.bind_texture(glow::TEXTURE_2D, None);

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);

            let depth_tex = Texture {
                gl: Arc::clone(gl),
                id: tex,
                width: size,
                height: size,
            };

            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.delete_framebuffer(fbo);
                return Err(format!("Framebuffer incomplete (status {status:#x})"));
            }

            Ok(Self {
                gl: Arc::clone(gl),
                fbo,
                depth_tex,
            })
        }
    }

    /// Binds the framebuffer for rendering.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
        }
    }

    /// Unbinds the framebuffer, reverting to the default framebuffer.
    pub fn unbind(gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    /// Returns the depth texture of the framebuffer.
    pub fn depth_texture(&self) -> &Texture {
        &self.depth_tex
    }

    /// Returns the edge length of the depth texture in texels.
    pub fn size(&self) -> u32 {
        self.depth_tex.width()
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_framebuffer(self.fbo);
        }
    }
}
