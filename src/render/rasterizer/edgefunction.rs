//! Edge function-based triangle rasterization.
//!
//! For an edge from point A to point B, the edge function at point P is:
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! the 2D cross product (B - A) x (P - A). A pixel is covered when its center
//! lies on the inner side of all three edges. The edge function values,
//! divided by the triangle's doubled area, are its barycentric coordinates.
//!
//! # Exact coverage
//!
//! The stencil pass flips a bit per covered pixel, so a pixel center lying
//! exactly on an edge shared by two fan triangles must be claimed by exactly
//! one of them, or the even-odd parity breaks along every fan spoke. Vertices
//! are therefore snapped to a fixed-point grid with [`SUBPIXEL_BITS`] of
//! fraction and the edge functions evaluated in integers, where
//! `E_AB(P) == -E_BA(P)` holds exactly. Ties go to the top-left rule.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)

use super::shader::PixelShader;
use super::{ScreenVertex, Triangle};
use crate::render::framebuffer::FrameBuffer;

/// Fractional bits of the fixed-point vertex grid.
pub const SUBPIXEL_BITS: u32 = 8;
const SUBPIXEL_ONE: i64 = 1 << SUBPIXEL_BITS;
const HALF_PIXEL: i64 = SUBPIXEL_ONE / 2;

/// Largest pixel coordinate accepted; keeps the integer edge functions far
/// from overflow.
const MAX_COORD: f32 = 1.0e6;

#[derive(Clone, Copy, Debug)]
struct FixedPoint {
    x: i64,
    y: i64,
}

impl FixedPoint {
    fn snap(v: &ScreenVertex) -> Option<Self> {
        let p = v.position;
        if !p.x.is_finite() || !p.y.is_finite() || p.x.abs() > MAX_COORD || p.y.abs() > MAX_COORD {
            return None;
        }
        Some(Self {
            x: (p.x * SUBPIXEL_ONE as f32).round() as i64,
            y: (p.y * SUBPIXEL_ONE as f32).round() as i64,
        })
    }
}

/// Triangle rasterizer using the edge function algorithm.
///
/// Iterates over the pixels of the triangle's bounding box and tests each
/// center against the three edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    pub fn new() -> Self {
        EdgeFunctionRasterizer
    }

    #[inline]
    fn edge_function(a: FixedPoint, b: FixedPoint, p: FixedPoint) -> i64 {
        (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
    }

    /// Whether pixels exactly on edge `a -> b` belong to the triangle, for a
    /// triangle with positive area. Of the two directions of any edge,
    /// exactly one qualifies.
    #[inline]
    fn is_top_left(a: FixedPoint, b: FixedPoint) -> bool {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        dy > 0 || (dy == 0 && dx < 0)
    }

    /// Calls `f(x, y, lambda)` for every covered pixel.
    ///
    /// `lambda[i]` weights `triangle.vertices[i]`.
    fn for_each_covered<F>(triangle: &Triangle, width: u32, height: u32, mut f: F)
    where
        F: FnMut(i32, i32, [f32; 3]),
    {
        let snapped = [
            FixedPoint::snap(&triangle.vertices[0]),
            FixedPoint::snap(&triangle.vertices[1]),
            FixedPoint::snap(&triangle.vertices[2]),
        ];
        let [Some(v0), Some(mut v1), Some(mut v2)] = snapped else {
            return;
        };

        // Normalize to positive area; remember the swap for the weights.
        let mut area = Self::edge_function(v0, v1, v2);
        if area == 0 {
            return;
        }
        let swapped = area < 0;
        if swapped {
            std::mem::swap(&mut v1, &mut v2);
            area = -area;
        }
        let inv_area = 1.0 / area as f64;

        // Bounding box in pixels, clipped to the buffer.
        let to_pixel = |c: i64| c.div_euclid(SUBPIXEL_ONE);
        let min_x = to_pixel(v0.x.min(v1.x).min(v2.x)).max(0);
        let max_x = to_pixel(v0.x.max(v1.x).max(v2.x)).min(width as i64 - 1);
        let min_y = to_pixel(v0.y.min(v1.y).min(v2.y)).max(0);
        let max_y = to_pixel(v0.y.max(v1.y).max(v2.y)).min(height as i64 - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let bias = |a: FixedPoint, b: FixedPoint| if Self::is_top_left(a, b) { 0 } else { 1 };
        let bias0 = bias(v1, v2);
        let bias1 = bias(v2, v0);
        let bias2 = bias(v0, v1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                // Sample at pixel center
                let p = FixedPoint {
                    x: x * SUBPIXEL_ONE + HALF_PIXEL,
                    y: y * SUBPIXEL_ONE + HALF_PIXEL,
                };
                let w0 = Self::edge_function(v1, v2, p);
                let w1 = Self::edge_function(v2, v0, p);
                let w2 = Self::edge_function(v0, v1, p);

                if w0 - bias0 < 0 || w1 - bias1 < 0 || w2 - bias2 < 0 {
                    continue;
                }

                let l0 = (w0 as f64 * inv_area) as f32;
                let l1 = (w1 as f64 * inv_area) as f32;
                let l2 = (w2 as f64 * inv_area) as f32;
                let lambda = if swapped { [l0, l2, l1] } else { [l0, l1, l2] };
                f(x as i32, y as i32, lambda);
            }
        }
    }

    /// Inverts the stencil bit of every pixel the triangle covers.
    pub fn invert_stencil(&self, triangle: &Triangle, buffer: &mut FrameBuffer) {
        let (width, height) = (buffer.width(), buffer.height());
        Self::for_each_covered(triangle, width, height, |x, y, _| {
            buffer.invert_stencil(x, y);
        });
    }

    /// Shades every covered pixel whose stencil bit equals `reference`.
    pub fn fill_triangle<S: PixelShader>(
        &self,
        triangle: &Triangle,
        buffer: &mut FrameBuffer,
        shader: &S,
        reference: u8,
    ) {
        let (width, height) = (buffer.width(), buffer.height());
        Self::for_each_covered(triangle, width, height, |x, y, lambda| {
            if buffer.get_stencil(x, y) == Some(reference & 1) {
                buffer.set_pixel(x, y, shader.shade(lambda));
            }
        });
    }
}
