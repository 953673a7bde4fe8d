//! Triangle rasterization.
//!
//! One algorithm, [`EdgeFunctionRasterizer`], serves both passes of the
//! light: the stencil fan (coverage only, bit inverted per covered pixel)
//! and the shaded mesh gated by the stencil.

mod edgefunction;
pub mod shader;

pub use edgefunction::EdgeFunctionRasterizer;

use crate::math::vec2::Vec2;

/// A projected vertex: pixel position plus what perspective-correct
/// interpolation needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    /// Pixel coordinates, y down.
    pub position: Vec2,
    /// Reciprocal of clip-space w.
    pub inv_w: f32,
    pub uv: Vec2,
}

impl ScreenVertex {
    pub fn new(position: Vec2, inv_w: f32, uv: Vec2) -> Self {
        Self {
            position,
            inv_w,
            uv,
        }
    }

    /// A vertex with no attributes, e.g. for the stencil pass.
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), 1.0, Vec2::ZERO)
    }
}

/// A triangle ready for rasterization in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [ScreenVertex; 3],
}

impl Triangle {
    pub fn new(vertices: [ScreenVertex; 3]) -> Self {
        Self { vertices }
    }

    /// Screen-space area in square pixels.
    pub fn area(&self) -> f32 {
        let [a, b, c] = self.vertices.map(|v| v.position);
        0.5 * (b - a).cross(c - a).abs()
    }

    /// Area in UV units.
    pub fn uv_area(&self) -> f32 {
        let [a, b, c] = self.vertices.map(|v| v.uv);
        0.5 * (b - a).cross(c - a).abs()
    }
}
