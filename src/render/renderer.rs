//! The CPU renderer.
//!
//! Owns the color and stencil buffers and draws the light in two passes:
//! the boundary fan into the stencil only, then the light's mesh wherever
//! the stencil bit is set.

use super::framebuffer::FrameBuffer;
use super::rasterizer::shader::{FlatShader, LightTextureShader};
use super::rasterizer::{EdgeFunctionRasterizer, ScreenVertex, Triangle};
use crate::colors;
use crate::light::BezierLight;
use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::mesh::Mesh;

/// Clip-space w below which a vertex counts as behind the camera.
const MIN_CLIP_W: f32 = 1.0e-4;

pub struct Renderer {
    color_buffer: Vec<u32>,
    stencil_buffer: Vec<u8>,
    width: u32,
    height: u32,
    rasterizer: EdgeFunctionRasterizer,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![colors::BACKGROUND; size],
            stencil_buffer: vec![0; size],
            width,
            height,
            rasterizer: EdgeFunctionRasterizer::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color_buffer = vec![colors::BACKGROUND; size];
        self.stencil_buffer = vec![0; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Clears color to `color` and the stencil to 0.
    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
        self.stencil_buffer.fill(0);
    }

    /// Projects a point to pixel coordinates (y down). `None` when the point
    /// is behind the camera.
    pub fn project(&self, mvp: Mat4, p: Vec3, uv: Vec2) -> Option<ScreenVertex> {
        let clip = mvp * Vec4::from(p);
        if clip.w < MIN_CLIP_W {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc_x = clip.x * inv_w;
        let ndc_y = clip.y * inv_w;
        let x = (ndc_x + 1.0) * 0.5 * self.width as f32;
        let y = (1.0 - ndc_y) * 0.5 * self.height as f32;
        Some(ScreenVertex::new(Vec2::new(x, y), inv_w, uv))
    }

    fn project_triangle(&self, mvp: Mat4, corners: [(Vec3, Vec2); 3]) -> Option<Triangle> {
        let a = self.project(mvp, corners[0].0, corners[0].1)?;
        let b = self.project(mvp, corners[1].0, corners[1].1)?;
        let c = self.project(mvp, corners[2].0, corners[2].1)?;
        Some(Triangle::new([a, b, c]))
    }

    /// Inverts the stencil under every triangle of the fan `fan[0], fan[i],
    /// fan[i + 1]`. Overlapping coverage cancels out pairwise, leaving the
    /// even-odd interior of the closed polyline `fan[1..]` set.
    pub fn draw_stencil_fan(&mut self, fan: &[Vec3], mvp: Mat4) {
        if fan.len() < 3 {
            return;
        }
        let hub = fan[0];
        let mut skipped = 0;
        let rasterizer = self.rasterizer;
        for pair in fan[1..].windows(2) {
            let corners = [(hub, Vec2::ZERO), (pair[0], Vec2::ZERO), (pair[1], Vec2::ZERO)];
            match self.project_triangle(mvp, corners) {
                Some(triangle) => rasterizer.invert_stencil(&triangle, &mut self.as_framebuffer()),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("{skipped} stencil fan triangles behind the camera were skipped");
        }
    }

    /// Draws `mesh` under `mvp` where the stencil bit is 1, shaded with the
    /// light texture if there is one, flat emitted radiance otherwise.
    pub fn draw_light_mesh(&mut self, light: &BezierLight, mesh: &Mesh, mvp: Mat4) {
        let rasterizer = self.rasterizer;
        let flat = FlatShader::new(light.le);
        for tri in mesh.triangles() {
            let corners = tri.map(|v| (v.position, v.uv));
            let Some(triangle) = self.project_triangle(mvp, corners) else {
                continue;
            };
            match light.texture() {
                Some(texture) => {
                    let lod = Self::select_lod(&triangle, texture.width(), texture.height());
                    let shader = LightTextureShader::new(
                        texture,
                        lod,
                        light.le,
                        triangle.vertices.map(|v| v.uv),
                        triangle.vertices.map(|v| v.inv_w),
                    );
                    rasterizer.fill_triangle(&triangle, &mut self.as_framebuffer(), &shader, 1);
                }
                None => rasterizer.fill_triangle(&triangle, &mut self.as_framebuffer(), &flat, 1),
            }
        }
    }

    /// Mip level for a triangle: log2 of the texels covered per pixel.
    fn select_lod(triangle: &Triangle, tex_width: u32, tex_height: u32) -> u32 {
        let pixels = triangle.area();
        if pixels <= 0.0 {
            return 0;
        }
        let texels = triangle.uv_area() * tex_width as f32 * tex_height as f32;
        let ratio = (texels / pixels).sqrt();
        if ratio <= 1.0 {
            0
        } else {
            ratio.log2().floor() as u32
        }
    }

    /// Stencil pass followed by the gated mesh pass.
    pub fn draw_light(&mut self, light: &BezierLight, mesh: &Mesh, view_projection: Mat4) {
        let mvp = view_projection * light.model_matrix();
        self.stencil_buffer.fill(0);
        self.draw_stencil_fan(light.sample_boundary(), mvp);
        self.draw_light_mesh(light, mesh, mvp);
    }

    pub fn color_buffer(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn stencil_buffer(&self) -> &[u8] {
        &self.stencil_buffer
    }

    /// The color buffer as raw ARGB8888 bytes, ready for a streaming texture.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: u32 has no padding and a stricter alignment than u8; the
        // slice covers exactly the buffer's bytes and borrows self.
        unsafe {
            std::slice::from_raw_parts(
                self.color_buffer.as_ptr() as *const u8,
                self.color_buffer.len() * 4,
            )
        }
    }

    /// The color buffer as RGBA bytes for image encoding.
    pub fn to_rgba8(&self) -> Vec<u8> {
        colors::to_rgba8(&self.color_buffer)
    }

    /// Get a mutable FrameBuffer view into the color and stencil buffers.
    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.stencil_buffer,
            self.width,
            self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, LightConfig};
    use crate::shape::{ShapeCatalog, ShapeId};
    use crate::texture::SourceImage;

    /// Orthographic-ish setup: model square [-1, 1] fills the viewport.
    fn identity_light(shape: ShapeId) -> BezierLight {
        let catalog = ShapeCatalog::embedded().unwrap();
        let mut light = BezierLight::new(&catalog, shape, &LightConfig::default());
        light
            .transform_mut()
            .set_translation_xyz(0.0, 0.0, 0.0)
            .set_size(Vec2::ONE);
        light.apply_transform();
        light
    }

    fn lit_pixels(renderer: &Renderer) -> usize {
        renderer
            .color_buffer()
            .iter()
            .filter(|&&c| c != colors::BACKGROUND)
            .count()
    }

    #[test]
    fn test_project_maps_ndc_to_pixels() {
        let renderer = Renderer::new(100, 50);
        let v = renderer
            .project(Mat4::identity(), Vec3::new(-1.0, 1.0, 0.0), Vec2::ZERO)
            .unwrap();
        assert_eq!(v.position, Vec2::new(0.0, 0.0));
        let v = renderer
            .project(Mat4::identity(), Vec3::new(1.0, -1.0, 0.0), Vec2::ZERO)
            .unwrap();
        assert_eq!(v.position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_quad_light_fills_viewport() {
        let light = identity_light(ShapeId::Quad);
        let mut renderer = Renderer::new(32, 32);
        renderer.draw_light(&light, &Mesh::unit_quad(), Mat4::identity());
        assert!(renderer.stencil_buffer().iter().all(|&s| s == 1));
        assert_eq!(lit_pixels(&renderer), 32 * 32);
        assert_eq!(renderer.color_buffer()[0], 0xFFFFFFFF);
    }

    #[test]
    fn test_stencil_masks_mesh_to_shape() {
        let light = identity_light(ShapeId::Teardrop);
        let mut renderer = Renderer::new(64, 64);
        renderer.draw_light(&light, &Mesh::unit_quad(), Mat4::identity());

        let lit = lit_pixels(&renderer);
        assert!(lit > 0 && lit < 64 * 64);
        // Corners of the quad lie outside the teardrop.
        assert_eq!(renderer.color_buffer()[0], colors::BACKGROUND);
        assert_eq!(renderer.stencil_buffer()[0], 0);
        // Its body sits below the tip at y = 0.65, around the origin.
        assert_eq!(renderer.stencil_buffer()[34 * 64 + 32], 1);
    }

    #[test]
    fn test_textured_light_samples_texture() {
        let mut light = identity_light(ShapeId::Quad);
        let source = SourceImage::uniform(8, [1.0, 0.0, 0.0, 1.0]).unwrap();
        light.build_texture(&source, &FilterConfig::default()).unwrap();
        let mut renderer = Renderer::new(16, 16);
        renderer.draw_light(&light, &Mesh::unit_quad(), Mat4::identity());
        assert_eq!(renderer.color_buffer()[8 * 16 + 8], 0xFFFF0000);
    }

    #[test]
    fn test_rgba_export() {
        let renderer = Renderer::new(2, 2);
        let bytes = renderer.to_rgba8();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &[0x4D, 0x4D, 0x4D, 0xFF]);
        assert_eq!(renderer.as_bytes().len(), 16);
    }
}
