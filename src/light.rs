//! The Bezier area light entity.
//!
//! Owns the boundary in model space, its world-space image under the light's
//! [`Transform`], the stencil polygon and (optionally) the prefiltered light
//! texture. Everything derived is rebuilt whenever the shape or the transform
//! changes, never patched in place.

use std::f32::consts::PI;
use std::time::Instant;

use crate::config::{ConfigError, FilterConfig, LightConfig};
use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::shape::{ControlPoints, ShapeCatalog, ShapeId, SAMPLE_SPLIT};
use crate::texture::{LightTexture, SourceImage};
use crate::transform::Transform;

/// World control points are pushed this far off `y = 0`, so later clipping
/// against the horizontal receiver plane never sees a point lying on it.
const PLANE_NUDGE: f32 = 1.0e-3;

/// Texture layout as seen by a shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub max_lod: u32,
}

/// Everything a receiver shader needs to integrate the light.
#[derive(Debug, Clone, PartialEq)]
pub struct LightUniforms {
    pub control_points: Vec<Vec3>,
    pub num_curves: usize,
    pub centroid: Vec3,
    pub model_matrix: Mat4,
    pub le: Vec3,
    pub two_sided: bool,
    pub texture: Option<TextureInfo>,
}

/// A planar area light bounded by a closed Bezier curve.
#[derive(Debug, Clone)]
pub struct BezierLight {
    shape: ShapeId,
    model_points: ControlPoints,
    model_centroid: Vec3,
    samples: Vec<Vec3>,

    transform: Transform,
    model_matrix: Mat4,
    world_points: Vec<Vec3>,
    world_centroid: Vec3,

    pub le: Vec3,
    pub two_sided: bool,
    pub moving: bool,
    texture: Option<LightTexture>,
}

impl BezierLight {
    pub fn new(catalog: &ShapeCatalog, shape: ShapeId, config: &LightConfig) -> Self {
        let [r, g, b] = config.le;
        let mut light = Self::from_control_points(shape, catalog.control_points(shape));
        light.le = Vec3::new(r, g, b);
        light.two_sided = config.two_sided;
        light.moving = config.moving;
        light
    }

    /// Placement every freshly built shape starts from: size 2x2, no
    /// rotation, lifted 1.3 above the ground.
    pub fn default_transform() -> Transform {
        let mut transform = Transform::new();
        transform
            .set_translation_xyz(0.0, 1.3, 0.0)
            .set_size(Vec2::new(2.0, 2.0));
        transform
    }

    /// A light over arbitrary control points, with the default placement.
    pub fn from_control_points(shape: ShapeId, model_points: ControlPoints) -> Self {
        let mut light = Self {
            shape,
            model_centroid: model_points.centroid(),
            samples: model_points.sample_boundary(SAMPLE_SPLIT),
            model_points,
            transform: Self::default_transform(),
            model_matrix: Mat4::identity(),
            world_points: Vec::new(),
            world_centroid: Vec3::ZERO,
            le: Vec3::ONE,
            two_sided: false,
            moving: false,
            texture: None,
        };
        light.apply_transform();
        light
    }

    /// Switches to another catalog shape, back at the default placement.
    /// The old texture no longer matches the boundary and is dropped.
    pub fn set_shape(&mut self, catalog: &ShapeCatalog, shape: ShapeId) {
        let model_points = catalog.control_points(shape);
        self.model_centroid = model_points.centroid();
        self.samples = model_points.sample_boundary(SAMPLE_SPLIT);
        self.model_points = model_points;
        self.shape = shape;
        self.texture = None;
        self.transform = Self::default_transform();
        self.apply_transform();
        log::info!(
            "light shape is now {shape}: {} curves",
            self.model_points.num_curves()
        );
    }

    /// Recomputes the model matrix and everything in world space.
    pub fn apply_transform(&mut self) {
        self.model_matrix = self.transform.to_matrix();
        let m = self.model_matrix;
        self.world_points = self
            .model_points
            .points()
            .iter()
            .map(|&p| {
                let mut w = m * p;
                w.y += if w.y > 0.0 { PLANE_NUDGE } else { -PLANE_NUDGE };
                w
            })
            .collect();
        self.world_centroid = m * self.model_centroid;
    }

    /// Bob and spin for frame `frame`. No-op unless the light is `moving`.
    pub fn animate(&mut self, frame: u32) {
        if !self.moving {
            return;
        }
        let f = frame as f32;
        self.transform
            .set_height(1.5 * (PI * f / 120.0).cos())
            .set_rotation_z(-0.5 * f);
        self.apply_transform();
    }

    /// Prefilters `source` against this light's boundary.
    pub fn build_texture(
        &mut self,
        source: &SourceImage,
        filter: &FilterConfig,
    ) -> Result<(), ConfigError> {
        let start = Instant::now();
        let texture = LightTexture::build(source, &self.model_points, filter)?;
        log::info!(
            "light texture for {} ready in {:.1?}",
            self.shape,
            start.elapsed()
        );
        self.texture = Some(texture);
        Ok(())
    }

    /// Installs a texture built elsewhere for the current shape.
    pub fn set_texture(&mut self, texture: LightTexture) {
        self.texture = Some(texture);
    }

    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn model_points(&self) -> &ControlPoints {
        &self.model_points
    }

    pub fn world_points(&self) -> &[Vec3] {
        &self.world_points
    }

    pub fn model_centroid(&self) -> Vec3 {
        self.model_centroid
    }

    pub fn world_centroid(&self) -> Vec3 {
        self.world_centroid
    }

    /// Stencil fan in model space: hub at the origin, then the boundary.
    pub fn sample_boundary(&self) -> &[Vec3] {
        &self.samples
    }

    /// The stencil fan carried into world space.
    pub fn world_sample_boundary(&self) -> Vec<Vec3> {
        self.samples.iter().map(|&p| self.model_matrix * p).collect()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable access to the placement; call [`apply_transform`] afterwards.
    ///
    /// [`apply_transform`]: BezierLight::apply_transform
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn texture(&self) -> Option<&LightTexture> {
        self.texture.as_ref()
    }

    pub fn is_textured(&self) -> bool {
        self.texture.is_some()
    }

    pub fn uniforms(&self) -> LightUniforms {
        LightUniforms {
            control_points: self.world_points.clone(),
            num_curves: self.model_points.num_curves(),
            centroid: self.world_centroid,
            model_matrix: self.model_matrix,
            le: self.le,
            two_sided: self.two_sided,
            texture: self.texture.as_ref().map(|t| TextureInfo {
                width: t.width(),
                height: t.height(),
                margin: t.margin(),
                max_lod: t.max_lod(),
            }),
        }
    }
}
