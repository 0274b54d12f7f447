//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture,
//! and [`CubeTexture`] for six-faced environment maps.

use std::{num::NonZero, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

/// How texture coordinates outside of `[0, 1]` are handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    Clamp,
    Repeat,
}

/// Texel sampling filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Sampling state baked into a texture at upload time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    pub wrap: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mipmaps: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap: Wrap::Clamp,
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mipmaps: true,
        }
    }
}

impl TextureOptions {
    /// Repeating texture with otherwise default sampling.
    pub fn repeat() -> Self {
        Self {
            wrap: Wrap::Repeat,
            ..Self::default()
        }
    }

    /// Pixelated sampling without mipmaps.
    pub fn nearest() -> Self {
        Self {
            min_filter: Filter::Nearest,
            mag_filter: Filter::Nearest,
            mipmaps: false,
            ..Self::default()
        }
    }

    fn gl_wrap(&self) -> i32 {
        match self.wrap {
            Wrap::Clamp => glow::CLAMP_TO_EDGE as i32,
            Wrap::Repeat => glow::REPEAT as i32,
        }
    }

    fn gl_min_filter(&self) -> i32 {
        (match (self.min_filter, self.mipmaps) {
            (Filter::Nearest, false) => glow::NEAREST,
            (Filter::Linear, false) => glow::LINEAR,
            (Filter::Nearest, true) => glow::NEAREST_MIPMAP_LINEAR,
            (Filter::Linear, true) => glow::LINEAR_MIPMAP_LINEAR,
        }) as i32
    }

    fn gl_mag_filter(&self) -> i32 {
        (match self.mag_filter {
            Filter::Nearest => glow::NEAREST,
            Filter::Linear => glow::LINEAR,
        }) as i32
    }
}

/// Represents a handle to a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub NonZero<u32>);

impl TextureHandle {
    /// Binds the texture handle to the specified texture unit.
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(glow::NativeTexture(self.0)));
        }
    }
}

/// Represents a texture stored on the GPU side.
pub struct Texture {
    pub(super) gl: Arc<glow::Context>,
    pub(super) id: glow::Texture,
    pub(super) width: u32,
    pub(super) height: u32,
}

impl Texture {
    /// Creates a new texture from the given [`image::DynamicImage`].
    pub fn new(
        gl: &Arc<glow::Context>,
        image: &DynamicImage,
        options: TextureOptions,
    ) -> Result<Self, String> {
        let (width, height) = image.dimensions();
        let data = image.to_rgba8().into_raw();
        Self::new_from_data(gl, width, height, &data, options)
    }

    /// Creates a new texture from the given raw RGBA data.
    pub fn new_from_data(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        data: &[u8],
        options: TextureOptions,
    ) -> Result<Self, String> {
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
            if options.mipmaps {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, options.gl_wrap());
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, options.gl_wrap());
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                options.gl_min_filter(),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                options.gl_mag_filter(),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                width,
                height,
            })
        }
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns a handle to the texture.
    pub fn handle(&self) -> TextureHandle {
        TextureHandle(self.id.0)
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

impl From<&Texture> for TextureHandle {
    fn from(texture: &Texture) -> Self {
        texture.handle()
    }
}

/// Handle to a cube map texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CubeTextureHandle(pub NonZero<u32>);

impl CubeTextureHandle {
    /// Binds the cube map to the specified texture unit.
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(glow::NativeTexture(self.0)));
        }
    }
}

/// A six-faced cube map, faces ordered +X, -X, +Y, -Y, +Z, -Z.
pub struct CubeTexture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
}

impl CubeTexture {
    /// Uploads the six faces. All faces must share the same dimensions.
    pub fn new(gl: &Arc<glow::Context>, faces: &[DynamicImage; 6]) -> Result<Self, String> {
        let size = faces[0].dimensions();
        if faces.iter().any(|face| face.dimensions() != size) {
            return Err("Cube map faces must all have the same size".to_string());
        }
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            for (i, face) in faces.iter().enumerate() {
                let data = face.to_rgba8().into_raw();
                gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                    0,
                    glow::RGBA as i32,
                    size.0 as i32,
                    size.1 as i32,
                    0,
                    glow::RGBA,
                    glow::UNSIGNED_BYTE,
                    glow::PixelUnpackData::Slice(Some(data.as_slice())),
                );
            }
            gl.generate_mipmap(glow::TEXTURE_CUBE_MAP);
            for param in [
                glow::TEXTURE_WRAP_S,
                glow::TEXTURE_WRAP_T,
                glow::TEXTURE_WRAP_R,
            ] {
                gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, param, glow::CLAMP_TO_EDGE as i32);
            }
            gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
            })
        }
    }

    /// Returns a handle to the cube map.
    pub fn handle(&self) -> CubeTextureHandle {
        CubeTextureHandle(self.id.0)
    }
}

impl Drop for CubeTexture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}
