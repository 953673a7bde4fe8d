//! Prefiltered mip chain of a light texture.
//!
//! Level 0 is the source image clipped to the light boundary: exterior
//! texels are zeroed, interior texels keep their color. Each coarser level
//! averages 2x2 blocks of the previous level's unfiltered texels. The stored
//! levels are blurred copies:
//!
//! - level 0: interior texels unchanged; exterior texels within reach of the
//!   boundary get a Gaussian whose radius grows with their distance, so the
//!   light's colors bleed outwards; far exterior texels stay black.
//! - levels > 0: every texel gets the fixed interior kernel.
//!
//! Zero-valued neighbours are treated as missing data, not as black, and the
//! remaining weights are renormalized.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;

use super::classify::BoundaryClassifier;
use super::kernel::{GaussianKernel, KernelBank};
use super::{save_rgba8, to_byte, SourceImage, Texel, TextureError};
use crate::config::{ConfigError, FilterConfig};
use crate::shape::ControlPoints;

/// One filtered level, row 0 at the top (`v = 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<Texel>,
}

impl MipLevel {
    #[inline]
    pub fn texel(&self, col: u32, row: u32) -> Texel {
        self.texels[(row * self.width + col) as usize]
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        self.texels.iter().flat_map(|t| t.map(to_byte)).collect()
    }
}

/// Filtered light texture, ready for upload or sampling.
#[derive(Debug, Clone)]
pub struct LightTexture {
    levels: Vec<MipLevel>,
    margin: u32,
}

impl LightTexture {
    /// Clips `source` to the boundary described by `control_points` and
    /// builds the whole filtered chain.
    pub fn build(
        source: &SourceImage,
        control_points: &ControlPoints,
        filter: &FilterConfig,
    ) -> Result<Self, ConfigError> {
        let classifier = BoundaryClassifier::new(control_points);
        let clipped = clip_to_boundary(source, &classifier);
        Self::from_clipped(clipped, &classifier, filter)
    }

    /// Builds the chain from an already clipped level 0.
    pub fn from_clipped(
        clipped: SourceImage,
        classifier: &BoundaryClassifier,
        filter: &FilterConfig,
    ) -> Result<Self, ConfigError> {
        filter.validate()?;
        let start = Instant::now();
        let margin = 0;
        let max_lod = (clipped.width() + 2 * margin).ilog2();

        let interior = GaussianKernel::new(filter.interior_kernel_size, filter.interior_sigma);
        let bank = KernelBank::new(filter.overlap, filter.max_dist);

        let mut levels = Vec::with_capacity(max_lod as usize + 1);
        let mut size = clipped.width();
        let mut unfiltered = clipped.into_texels();

        for lod in 0..=max_lod {
            if lod > 0 {
                unfiltered = downsample(&unfiltered, size);
                size /= 2;
            }
            let level_start = Instant::now();
            let texels = if lod == 0 {
                filter_base_level(&unfiltered, size, classifier, &bank)
            } else {
                filter_level(&unfiltered, size, &interior)
            };
            log::debug!(
                "mip level {lod}: {size}x{size} filtered in {:.1?}",
                level_start.elapsed()
            );
            levels.push(MipLevel {
                width: size,
                height: size,
                texels,
            });
        }

        log::info!(
            "built light texture {}x{} with {} levels in {:.1?}",
            levels[0].width,
            levels[0].height,
            levels.len(),
            start.elapsed()
        );
        Ok(Self { levels, margin })
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Index of the coarsest (1x1) level.
    pub fn max_lod(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    pub fn level(&self, lod: u32) -> &MipLevel {
        &self.levels[lod as usize]
    }

    /// Nearest-texel lookup with clamp-to-edge addressing. Levels past the
    /// coarsest one read the coarsest.
    pub fn sample(&self, u: f32, v: f32, lod: u32) -> [f32; 3] {
        let level = self.level(lod.min(self.max_lod()));
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let col = (u * (level.width - 1) as f32).round() as u32;
        let row = ((1.0 - v) * (level.height - 1) as f32).round() as u32;
        let [r, g, b, _] = level.texel(col, row);
        [r, g, b]
    }

    pub fn save_level_png<P: AsRef<Path>>(&self, lod: u32, path: P) -> Result<(), TextureError> {
        let level = self.level(lod);
        save_rgba8(path.as_ref(), level.width, level.height, level.to_rgba8())
    }
}

/// Zeroes every channel of texels outside the boundary.
pub fn clip_to_boundary(source: &SourceImage, classifier: &BoundaryClassifier) -> SourceImage {
    let width = source.width();
    let height = source.height();
    let mut texels = source.texels().to_vec();

    texels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, line)| {
            for (col, texel) in line.iter_mut().enumerate() {
                let uv = BoundaryClassifier::texel_uv(col as u32, row as u32, width, height);
                if !classifier.is_inside(uv) {
                    *texel = [0.0; 4];
                }
            }
        });

    SourceImage {
        width,
        height,
        texels,
    }
}

/// Averages 2x2 blocks of a `size x size` level into a `size/2` level.
/// Alpha of the result is 1.
pub fn downsample(texels: &[Texel], size: u32) -> Vec<Texel> {
    let size = size as usize;
    let half = size / 2;
    let mut out = vec![[0.0; 4]; half * half];
    out.par_chunks_mut(half.max(1))
        .enumerate()
        .for_each(|(row, line)| {
            let top = 2 * row * size;
            let bottom = top + size;
            for (col, texel) in line.iter_mut().enumerate() {
                let c = 2 * col;
                let quad = [
                    texels[top + c],
                    texels[top + c + 1],
                    texels[bottom + c],
                    texels[bottom + c + 1],
                ];
                for ch in 0..3 {
                    texel[ch] = 0.25 * (quad[0][ch] + quad[1][ch] + quad[2][ch] + quad[3][ch]);
                }
                texel[3] = 1.0;
            }
        });
    out
}

/// Convolves the RGB channels around `(col, row)` with `kernel`.
///
/// Neighbours outside the image, and channel values that are exactly zero,
/// do not contribute; their weight is removed from the normalizer. Returns
/// zero for a channel with no contributing neighbour.
pub fn convolve(
    texels: &[Texel],
    width: u32,
    height: u32,
    col: u32,
    row: u32,
    kernel: &GaussianKernel,
) -> [f32; 3] {
    let radius = kernel.radius();
    let (w, h) = (width as i32, height as i32);
    let (cx, cy) = (col as i32, row as i32);

    let mut weighted = [0.0f32; 3];
    let mut weight_loss = [1.0f32; 3];

    for dy in -radius..=radius {
        let y = cy + dy;
        for dx in -radius..=radius {
            let x = cx + dx;
            let weight = kernel.weight(dx, dy);
            if x < 0 || x >= w || y < 0 || y >= h {
                for loss in &mut weight_loss {
                    *loss -= weight;
                }
                continue;
            }
            let texel = &texels[(y * w + x) as usize];
            for ch in 0..3 {
                if texel[ch] == 0.0 {
                    weight_loss[ch] -= weight;
                } else {
                    weighted[ch] += weight * texel[ch];
                }
            }
        }
    }

    let mut out = [0.0f32; 3];
    for ch in 0..3 {
        if weighted[ch] != 0.0 && weight_loss[ch] > 0.0 {
            out[ch] = weighted[ch] / weight_loss[ch];
        }
    }
    out
}

fn with_unit_alpha([r, g, b]: [f32; 3]) -> Texel {
    [r, g, b, 1.0]
}

/// Level-0 filter: copy interior texels (alpha != 0), blur near exterior
/// texels with the bank kernel for their distance, copy the rest.
fn filter_base_level(
    texels: &[Texel],
    size: u32,
    classifier: &BoundaryClassifier,
    bank: &KernelBank,
) -> Vec<Texel> {
    let mut out = vec![[0.0; 4]; texels.len()];
    out.par_chunks_mut(size as usize)
        .enumerate()
        .for_each(|(row, line)| {
            let row = row as u32;
            for (col, texel) in line.iter_mut().enumerate() {
                let col = col as u32;
                let [r, g, b, a] = texels[(row * size + col) as usize];
                *texel = if a != 0.0 {
                    [r, g, b, 1.0]
                } else {
                    let uv = BoundaryClassifier::texel_uv(col, row, size, size);
                    let distance = classifier.exterior_distance(uv, size);
                    if distance > bank.reach() {
                        [r, g, b, 1.0]
                    } else {
                        let kernel = bank.for_distance(distance);
                        with_unit_alpha(convolve(texels, size, size, col, row, kernel))
                    }
                };
            }
        });
    out
}

/// Coarse-level filter: every texel gets the interior kernel.
fn filter_level(texels: &[Texel], size: u32, kernel: &GaussianKernel) -> Vec<Texel> {
    let mut out = vec![[0.0; 4]; texels.len()];
    out.par_chunks_mut(size as usize)
        .enumerate()
        .for_each(|(row, line)| {
            for (col, texel) in line.iter_mut().enumerate() {
                *texel = with_unit_alpha(convolve(
                    texels, size, size, col as u32, row as u32, kernel,
                ));
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3::Vec3;
    use crate::shape::{ShapeCatalog, ShapeId};
    use approx::assert_relative_eq;

    const GRAY: Texel = [0.5, 0.5, 0.5, 1.0];

    fn small_quad(scale: f32) -> ControlPoints {
        let catalog = ShapeCatalog::embedded().unwrap();
        let segments = catalog
            .control_points(ShapeId::Quad)
            .segments()
            .iter()
            .map(|s| s.map(|p: Vec3| p * scale))
            .collect();
        ControlPoints::new(segments).unwrap()
    }

    #[test]
    fn test_downsample_averages_blocks() {
        let texels = vec![
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0, 1.0],
        ];
        let out = downsample(&texels, 2);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], [0.5, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_downsample_of_uniform_is_uniform() {
        let mut texels = vec![GRAY; 64];
        let mut size = 8;
        while size > 1 {
            texels = downsample(&texels, size);
            size /= 2;
            assert!(texels.iter().all(|&t| t == GRAY));
        }
        assert_eq!(texels.len(), 1);
    }

    #[test]
    fn test_convolve_interior_is_weighted_sum() {
        // Ramp with no zero channels, so nothing is dropped from the sum.
        let value = |x: i32, y: i32, ch: usize| 0.1 + 0.01 * (x + 2 * y) as f32 + 0.05 * ch as f32;
        let texels: Vec<Texel> = (0..16 * 16)
            .map(|i| {
                let (x, y) = (i % 16, i / 16);
                [value(x, y, 0), value(x, y, 1), value(x, y, 2), 1.0]
            })
            .collect();
        let kernel = GaussianKernel::new(5, 1.5);
        let out = convolve(&texels, 16, 16, 8, 6, &kernel);

        for ch in 0..3 {
            let mut expected = 0.0;
            for dy in -2..=2 {
                for dx in -2..=2 {
                    expected += kernel.weight(dx, dy) * value(8 + dx, 6 + dy, ch);
                }
            }
            assert_relative_eq!(out[ch], expected, epsilon = 1e-5);
        }
        // Symmetric kernel over a linear ramp lands on the centre value.
        assert_relative_eq!(out[0], value(8, 6, 0), epsilon = 1e-4);
    }

    #[test]
    fn test_convolve_renormalizes_at_border() {
        let texels = vec![GRAY; 8 * 8];
        let kernel = GaussianKernel::new(7, 3.0);
        let out = convolve(&texels, 8, 8, 0, 0, &kernel);
        for ch in out {
            assert_relative_eq!(ch, 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_convolve_skips_zero_neighbours() {
        // Left half gray, right half black: black counts as missing data.
        let texels: Vec<Texel> = (0..8 * 8)
            .map(|i| if i % 8 < 4 { GRAY } else { [0.0; 4] })
            .collect();
        let kernel = GaussianKernel::new(5, 2.0);
        let out = convolve(&texels, 8, 8, 5, 4, &kernel);
        for ch in out {
            assert_relative_eq!(ch, 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_convolve_without_contributors_is_zero() {
        let texels = vec![[0.0; 4]; 8 * 8];
        let kernel = GaussianKernel::new(3, 1.0);
        assert_eq!(convolve(&texels, 8, 8, 3, 3, &kernel), [0.0; 3]);
    }

    #[test]
    fn test_chain_layout() {
        let source = SourceImage::uniform(16, GRAY).unwrap();
        let texture = LightTexture::build(&source, &small_quad(0.5), &FilterConfig::default()).unwrap();
        assert_eq!(texture.max_lod(), 4);
        assert_eq!(texture.margin(), 0);
        let sizes: Vec<u32> = texture.levels().iter().map(|l| l.width).collect();
        assert_eq!(sizes, vec![16, 8, 4, 2, 1]);
        for level in texture.levels() {
            assert_eq!(level.texels.len(), (level.width * level.height) as usize);
            assert!(level.texels.iter().all(|t| t[3] == 1.0));
        }
    }

    #[test]
    fn test_clip_zeroes_exterior() {
        let source = SourceImage::uniform(32, GRAY).unwrap();
        let cps = small_quad(0.5);
        let clipped = clip_to_boundary(&source, &BoundaryClassifier::new(&cps));
        // quad spans UV [0.25, 0.75]
        assert_eq!(clipped.texel(0, 0), [0.0; 4]);
        assert_eq!(clipped.texel(31, 16), [0.0; 4]);
        assert_eq!(clipped.texel(16, 16), GRAY);
    }

    #[test_log::test]
    fn test_full_quad_keeps_uniform_color() {
        let source = SourceImage::uniform(64, GRAY).unwrap();
        let catalog = ShapeCatalog::embedded().unwrap();
        let texture = LightTexture::build(
            &source,
            &catalog.control_points(ShapeId::Quad),
            &FilterConfig::default(),
        )
        .unwrap();
        let base = texture.level(0);
        for row in 1..63 {
            for col in 1..63 {
                assert_eq!(base.texel(col, row), GRAY);
            }
        }
        // Edge texels sit on the boundary; whichever side they land on, they
        // end up with the source color.
        for t in &base.texels {
            for ch in 0..3 {
                assert_relative_eq!(t[ch], 0.5, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_exterior_falloff() {
        // Narrow bank so the far region exists on a small image.
        let filter = FilterConfig {
            overlap: 3,
            max_dist: 12,
            ..FilterConfig::default()
        };
        let source = SourceImage::uniform(64, GRAY).unwrap();
        let cps = small_quad(0.25); // UV [0.375, 0.625], texels 24..=39
        let texture = LightTexture::build(&source, &cps, &filter).unwrap();
        let base = texture.level(0);

        assert_eq!(base.texel(32, 32), GRAY);
        // Far corner: untouched black, alpha forced to 1.
        assert_eq!(base.texel(0, 0), [0.0, 0.0, 0.0, 1.0]);

        // Just outside the left edge: blurred from the interior.
        let near = base.texel(20, 32);
        for ch in 0..3 {
            assert!(near[ch] > 0.0 && near[ch] <= 0.5 + 1e-5, "{near:?}");
        }
    }

    #[test]
    fn test_sample_is_nearest_with_clamp() {
        let source = SourceImage::uniform(4, GRAY).unwrap();
        let texture = LightTexture::build(&source, &small_quad(1.0), &FilterConfig::default()).unwrap();
        let inside = texture.sample(0.5, 0.5, 0);
        assert_relative_eq!(inside[0], 0.5, epsilon = 1e-4);
        assert_eq!(texture.sample(-3.0, 7.0, 0), texture.sample(0.0, 1.0, 0));
        assert_eq!(texture.sample(0.5, 0.5, 99), texture.sample(0.5, 0.5, 2));
    }

    #[test]
    fn test_coarse_levels_are_blurred_after_downsampling() {
        let source = SourceImage::uniform(32, GRAY).unwrap();
        let cps = small_quad(0.5);
        let classifier = BoundaryClassifier::new(&cps);
        let clipped = clip_to_boundary(&source, &classifier);
        let down = downsample(clipped.texels(), 32);
        let texture =
            LightTexture::from_clipped(clipped, &classifier, &FilterConfig::default()).unwrap();

        // Level 1 is 16 wide; the quad covers columns 4..=11 there, so
        // column 3 is a black block just outside the left edge.
        let (col, row) = (3, 8);
        let unfiltered = down[(row * 16 + col) as usize];
        assert_eq!(unfiltered, [0.0, 0.0, 0.0, 1.0]);

        let kernel = GaussianKernel::new(15, 9.0);
        let [r, g, b] = convolve(&down, 16, 16, col, row, &kernel);
        let filtered = texture.level(1).texel(col, row);
        assert_eq!(filtered, [r, g, b, 1.0]);
        assert_ne!(filtered, unfiltered);
        assert_relative_eq!(filtered[0], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_uniform_image_without_edge_is_uniform_at_every_level() {
        let source = SourceImage::uniform(32, GRAY).unwrap();
        let catalog = ShapeCatalog::embedded().unwrap();
        let texture = LightTexture::build(
            &source,
            &catalog.control_points(ShapeId::Quad),
            &FilterConfig::default(),
        )
        .unwrap();
        for (lod, level) in texture.levels().iter().enumerate() {
            for t in &level.texels {
                for ch in 0..3 {
                    assert_relative_eq!(t[ch], 0.5, epsilon = 1e-4);
                }
                assert_eq!(t[3], 1.0, "level {lod}");
            }
        }
    }

    #[test]
    fn test_degenerate_filter_is_rejected() {
        let source = SourceImage::uniform(8, GRAY).unwrap();
        let filter = FilterConfig {
            interior_sigma: 0.0,
            ..FilterConfig::default()
        };
        let result = LightTexture::build(&source, &small_quad(0.5), &filter);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
