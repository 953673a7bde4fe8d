//! Light texture construction.
//!
//! The pipeline turns a square RGBA image and a closed Bezier boundary into a
//! prefiltered mip chain:
//!
//! 1. [`SourceImage`] loads and validates the raster (square, power of two).
//! 2. [`classify::BoundaryClassifier`] decides inside/outside per texel and
//!    measures the distance of exterior texels to the boundary.
//! 3. [`mipchain::LightTexture::build`] clips level 0, downsamples, and blurs
//!    each level with the kernels of [`kernel`].

pub mod classify;
pub mod kernel;
pub mod mipchain;

use std::fmt;
use std::path::{Path, PathBuf};

pub use classify::{BoundaryClassifier, Region};
pub use kernel::{GaussianKernel, KernelBank};
pub use mipchain::{LightTexture, MipLevel};

/// One RGBA texel, channels in `[0, 1]`.
pub type Texel = [f32; 4];

#[derive(Debug)]
pub enum TextureError {
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
    /// The image is not square with a power-of-two side.
    InvalidSize { width: u32, height: u32 },
    /// A raw buffer does not hold `width * height` texels.
    BufferSize { expected: usize, actual: usize },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Load { path, source } => {
                write!(f, "failed to load image file {}: {source}", path.display())
            }
            TextureError::Save { path, source } => {
                write!(f, "failed to save image file {}: {source}", path.display())
            }
            TextureError::InvalidSize { width, height } => write!(
                f,
                "invalid texture size {width}x{height}: must be square with a power-of-two side"
            ),
            TextureError::BufferSize { expected, actual } => {
                write!(f, "texel buffer holds {actual} values, expected {expected}")
            }
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Load { source, .. } | TextureError::Save { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn validate_size(width: u32, height: u32) -> Result<(), TextureError> {
    if width != height || !width.is_power_of_two() {
        return Err(TextureError::InvalidSize { width, height });
    }
    Ok(())
}

/// Quantizes a `[0, 1]` channel to a byte.
#[inline]
pub(crate) fn to_byte(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

pub(crate) fn save_rgba8(
    path: &Path,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
) -> Result<(), TextureError> {
    let save_err = |source| TextureError::Save {
        path: path.to_path_buf(),
        source,
    };
    let buffer = image::RgbaImage::from_raw(width, height, bytes).ok_or_else(|| {
        save_err(image::ImageError::Parameter(
            image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ),
        ))
    })?;
    buffer.save(path).map_err(save_err)
}

/// A square power-of-two RGBA image with float channels.
///
/// Row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    texels: Vec<Texel>,
}

impl SourceImage {
    /// Load an image file (PNG, JPG, etc.) and convert it to float RGBA.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| TextureError::Load {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let image = Self::from_rgba8(width, height, img.as_raw())?;
        log::info!("loaded light image {} ({width}x{height})", path.display());
        Ok(image)
    }

    /// Wrap 8-bit RGBA bytes, row-major from the top row.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TextureError> {
        validate_size(width, height)?;
        let expected = (width * height * 4) as usize;
        if bytes.len() != expected {
            return Err(TextureError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        let texels = bytes
            .chunks_exact(4)
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                ]
            })
            .collect();
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Wrap float texels, row-major from the top row.
    pub fn from_texels(width: u32, height: u32, texels: Vec<Texel>) -> Result<Self, TextureError> {
        validate_size(width, height)?;
        let expected = (width * height) as usize;
        if texels.len() != expected {
            return Err(TextureError::BufferSize {
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// A `size x size` image filled with one color.
    pub fn uniform(size: u32, color: Texel) -> Result<Self, TextureError> {
        Self::from_texels(size, size, vec![color; (size * size) as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    pub fn into_texels(self) -> Vec<Texel> {
        self.texels
    }

    #[inline]
    pub fn texel(&self, col: u32, row: u32) -> Texel {
        self.texels[(row * self.width + col) as usize]
    }

    /// Write the image as an 8-bit PNG (debug aid).
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), TextureError> {
        let bytes = self.texels.iter().flat_map(|t| t.map(to_byte)).collect();
        save_rgba8(path.as_ref(), self.width, self.height, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_square() {
        let err = SourceImage::from_rgba8(4, 2, &[0; 32]).unwrap_err();
        assert!(matches!(
            err,
            TextureError::InvalidSize {
                width: 4,
                height: 2
            }
        ));
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let err = SourceImage::uniform(6, [1.0; 4]).unwrap_err();
        assert!(matches!(err, TextureError::InvalidSize { .. }));
        assert!(err.to_string().contains("6x6"));
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = SourceImage::from_rgba8(2, 2, &[0; 15]).unwrap_err();
        assert!(matches!(
            err,
            TextureError::BufferSize {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_bytes_become_unit_floats() {
        let bytes = [255, 0, 51, 255, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let image = SourceImage::from_rgba8(2, 2, &bytes).unwrap();
        assert_eq!(image.texel(0, 0), [1.0, 0.0, 0.2, 1.0]);
        assert_eq!(image.texel(1, 1), [0.0; 4]);
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = SourceImage::from_file("does/not/exist.png").unwrap_err();
        assert!(matches!(err, TextureError::Load { .. }));
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn test_png_round_trip() {
        let path = std::env::temp_dir().join("bezlight_source_image_test.png");
        let image = SourceImage::uniform(4, [1.0, 0.0, 0.0, 1.0]).unwrap();
        image.save_png(&path).unwrap();
        let loaded = SourceImage::from_file(&path).unwrap();
        assert_eq!(loaded, image);
        let _ = std::fs::remove_file(&path);
    }
}
