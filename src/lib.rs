//! Textured Bezier area lights on the CPU.
//!
//! A planar light is bounded by a closed chain of cubic Bezier curves. Any
//! square power-of-two image can be prefiltered into a mip chain that stays
//! well defined around that boundary, then drawn through a software stencil
//! so only the shape's interior lights up.
//!
//! # Quick Start
//!
//! ```ignore
//! use bezlight::prelude::*;
//!
//! let catalog = ShapeCatalog::embedded()?;
//! let source = SourceImage::from_file("light.png")?;
//! let texture = LightTexture::build(
//!     &source,
//!     &catalog.control_points(ShapeId::Rainbow),
//!     &FilterConfig::default(),
//! )?;
//! texture.save_level_png(0, "rainbow_lod0.png")?;
//! ```

pub mod bezier;
pub mod camera;
pub mod cli;
pub mod colors;
pub mod config;
pub mod engine;
pub mod light;
pub mod math;
pub mod mesh;
pub mod render;
pub mod shape;
pub mod texture;
pub mod transform;
#[cfg(feature = "viewer")]
pub mod window;

pub use engine::{Engine, EngineError};
pub use light::BezierLight;
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use bezlight::prelude::*;
/// ```
pub mod prelude {
    // Geometry
    pub use crate::bezier::{bernstein_table, evaluate};
    pub use crate::shape::{ControlPoints, ShapeCatalog, ShapeId};

    // Light
    pub use crate::camera::OrbitCamera;
    pub use crate::light::{BezierLight, LightUniforms};
    pub use crate::transform::Transform;

    // Texture building
    pub use crate::config::{Config, FilterConfig};
    pub use crate::texture::{BoundaryClassifier, KernelBank, LightTexture, SourceImage};

    // Engine
    pub use crate::engine::{Engine, EngineError};

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;
}
