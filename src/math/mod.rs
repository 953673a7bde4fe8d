//! Small f32 linear algebra used by the light model, the texture builder and
//! the CPU renderer.

pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;
