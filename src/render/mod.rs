//! Software rendering of the area light.
//!
//! - [`Renderer`]: owns the buffers, projects geometry, runs the stencil and
//!   mesh passes
//! - [`FrameBuffer`]: borrowed view of color + stencil
//! - [`rasterizer`]: edge-function coverage and pixel shaders

mod framebuffer;
pub mod rasterizer;
mod renderer;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{EdgeFunctionRasterizer, ScreenVertex, Triangle};
pub use renderer::Renderer;
