//! Texture loading with procedural fallbacks.
//!
//! Lessons reference their images by path relative to the asset directory. When a file is
//! missing or cannot be decoded the loader logs a warning and substitutes a generated image, so a
//! lesson always has something to sample.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use fastnoise_lite::{FastNoiseLite, NoiseType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::abs::{CubeTexture, Texture, TextureOptions};

/// Image generated when a texture file cannot be loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fallback {
    Solid([u8; 4]),
    Checker {
        a: [u8; 4],
        b: [u8; 4],
        cells: u32,
    },
    /// Greyscale value noise between `low` and `high`, tinted by `tint`.
    Noise {
        tint: [u8; 3],
        low: f32,
        high: f32,
        frequency: f32,
        seed: i32,
    },
    /// A flat tangent-space normal map.
    FlatNormal,
    /// White disc fading to transparent black at the edge.
    Sprite,
    /// White rounded rectangle on black, for door-shaped alpha maps.
    Inset { margin: f32 },
}

/// Edge length of generated fallback images.
pub const FALLBACK_SIZE: u32 = 128;

impl Fallback {
    /// Renders the fallback into an RGBA image of `size` x `size` pixels.
    pub fn generate(&self, size: u32) -> RgbaImage {
        let size = size.max(1);
        match *self {
            Fallback::Solid(color) => RgbaImage::from_pixel(size, size, Rgba(color)),
            Fallback::Checker { a, b, cells } => {
                let cell = (size / cells.max(1)).max(1);
                RgbaImage::from_fn(size, size, |x, y| {
                    if (x / cell + y / cell) % 2 == 0 {
                        Rgba(a)
                    } else {
                        Rgba(b)
                    }
                })
            }
            Fallback::Noise {
                tint,
                low,
                high,
                frequency,
                seed,
            } => {
                let mut noise = FastNoiseLite::new();
                noise.set_seed(Some(seed));
                noise.set_noise_type(Some(NoiseType::OpenSimplex2));
                noise.set_frequency(Some(frequency));
                RgbaImage::from_fn(size, size, |x, y| {
                    let n = noise.get_noise_2d(x as f32, y as f32) * 0.5 + 0.5;
                    let v = low + (high - low) * n.clamp(0.0, 1.0);
                    Rgba([
                        (tint[0] as f32 * v) as u8,
                        (tint[1] as f32 * v) as u8,
                        (tint[2] as f32 * v) as u8,
                        255,
                    ])
                })
            }
            Fallback::FlatNormal => RgbaImage::from_pixel(size, size, Rgba([128, 128, 255, 255])),
            Fallback::Sprite => {
                let half = size as f32 / 2.0;
                RgbaImage::from_fn(size, size, |x, y| {
                    let dx = (x as f32 + 0.5 - half) / half;
                    let dy = (y as f32 + 0.5 - half) / half;
                    let d = (dx * dx + dy * dy).sqrt();
                    let v = ((1.0 - d).clamp(0.0, 1.0).powf(1.5) * 255.0) as u8;
                    Rgba([v, v, v, v])
                })
            }
            Fallback::Inset { margin } => {
                let lo = margin * size as f32;
                let hi = size as f32 - lo;
                RgbaImage::from_fn(size, size, |x, y| {
                    let (x, y) = (x as f32 + 0.5, y as f32 + 0.5);
                    if x > lo && x < hi && y > lo {
                        Rgba([255, 255, 255, 255])
                    } else {
                        Rgba([0, 0, 0, 255])
                    }
                })
            }
        }
    }
}

/// Loads textures relative to an asset directory.
pub struct AssetLoader {
    gl: Arc<glow::Context>,
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(gl: &Arc<glow::Context>, root: impl Into<PathBuf>) -> Self {
        Self {
            gl: Arc::clone(gl),
            root: root.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Reads and decodes an image, falling back to `fallback` on any failure.
    pub fn image(&self, path: &str, fallback: Fallback) -> DynamicImage {
        load_image_or(&self.resolve(path), fallback)
    }

    /// Loads a 2D texture.
    pub fn texture(
        &self,
        path: &str,
        options: TextureOptions,
        fallback: Fallback,
    ) -> Result<Texture, String> {
        let texture = Texture::new(&self.gl, &self.image(path, fallback), options)?;
        log::debug!(
            "Uploaded {path} ({}x{})",
            texture.width(),
            texture.height()
        );
        Ok(texture)
    }

    /// Loads a cube map from a directory holding `px`, `nx`, `py`, `ny`, `pz` and `nz` images.
    pub fn cube_texture(&self, dir: &str, extension: &str) -> Result<CubeTexture, String> {
        let faces = CUBE_FACES.map(|face| {
            let path = format!("{dir}/{face}.{extension}");
            load_image_or(&self.resolve(&path), Fallback::Solid(sky_color(face)))
        });
        CubeTexture::new(&self.gl, &faces)
    }
}

/// Cube map faces in upload order.
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// Gradient-sky colour standing in for a missing cube map face.
fn sky_color(face: &str) -> [u8; 4] {
    match face {
        "py" => [180, 210, 255, 255],
        "ny" => [60, 55, 50, 255],
        _ => [130, 150, 180, 255],
    }
}

fn load_image_or(path: &Path, fallback: Fallback) -> DynamicImage {
    match image::open(path) {
        Ok(image) => {
            log::debug!("Loaded {}", path.display());
            image
        }
        Err(e) => {
            log::warn!(
                "Could not load {}: {e}; using a generated {fallback:?} image",
                path.display()
            );
            DynamicImage::ImageRgba8(fallback.generate(FALLBACK_SIZE))
        }
    }
}
