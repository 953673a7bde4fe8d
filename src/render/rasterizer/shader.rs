//! Pixel shaders for the light's mesh pass.
//!
//! The rasterizer handles coverage and barycentric coordinates; a shader
//! turns barycentric coordinates into a color, the way a fragment shader
//! sits behind the fixed-function rasterizer on a GPU.

use crate::colors::pack_color;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::texture::LightTexture;

/// Trait for per-pixel shading computations.
///
/// The `lambda` parameter holds the screen-space barycentric weights
/// [λ₀, λ₁, λ₂] of the pixel, summing to 1 inside the triangle.
pub trait PixelShader {
    fn shade(&self, lambda: [f32; 3]) -> u32;
}

/// Flat shader: the emitted radiance, for an untextured light.
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(le: Vec3) -> Self {
        Self {
            color: pack_color(le.x, le.y, le.z, 1.0),
        }
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _lambda: [f32; 3]) -> u32 {
        self.color
    }
}

/// Samples the prefiltered light texture at perspective-correct UVs and
/// scales by the emitted radiance.
pub struct LightTextureShader<'a> {
    texture: &'a LightTexture,
    lod: u32,
    le: Vec3,
    /// Per-vertex `uv / w`.
    uv_over_w: [Vec2; 3],
    /// Per-vertex `1 / w`.
    inv_w: [f32; 3],
}

impl<'a> LightTextureShader<'a> {
    pub fn new(texture: &'a LightTexture, lod: u32, le: Vec3, uvs: [Vec2; 3], inv_w: [f32; 3]) -> Self {
        Self {
            texture,
            lod,
            le,
            uv_over_w: [uvs[0] * inv_w[0], uvs[1] * inv_w[1], uvs[2] * inv_w[2]],
            inv_w,
        }
    }

    /// Interpolate UVs in clip space: screen-linear `uv/w` divided by
    /// screen-linear `1/w`.
    #[inline]
    fn interpolate_uv(&self, lambda: [f32; 3]) -> Vec2 {
        let inv_w = lambda[0] * self.inv_w[0] + lambda[1] * self.inv_w[1] + lambda[2] * self.inv_w[2];
        let uv = self.uv_over_w[0] * lambda[0]
            + self.uv_over_w[1] * lambda[1]
            + self.uv_over_w[2] * lambda[2];
        uv / inv_w
    }
}

impl PixelShader for LightTextureShader<'_> {
    #[inline]
    fn shade(&self, lambda: [f32; 3]) -> u32 {
        let uv = self.interpolate_uv(lambda);
        let [r, g, b] = self.texture.sample(uv.x, uv.y, self.lod);
        pack_color(r * self.le.x, g * self.le.y, b * self.le.z, 1.0)
    }
}
