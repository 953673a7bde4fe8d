//! Top-level driver.
//!
//! The [`Engine`] owns every piece of scene state (catalog, light, mesh,
//! camera, renderer and the source image) and exposes the handful of
//! operations the binaries drive: switch shape, step the animation, render,
//! capture a frame.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::camera::OrbitCamera;
use crate::colors;
use crate::config::{Config, ConfigError};
use crate::light::BezierLight;
use crate::mesh::{Mesh, MeshError};
use crate::render::Renderer;
use crate::shape::catalog::CatalogError;
use crate::shape::{ShapeCatalog, ShapeId};
use crate::texture::mipchain::clip_to_boundary;
use crate::texture::{save_rgba8, BoundaryClassifier, LightTexture, SourceImage, TextureError};

/// Frame the animation clock starts from.
pub const START_FRAME: u32 = 260;

#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    Catalog(CatalogError),
    Texture(TextureError),
    Mesh(MeshError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => e.fmt(f),
            EngineError::Catalog(e) => e.fmt(f),
            EngineError::Texture(e) => e.fmt(f),
            EngineError::Mesh(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            EngineError::Catalog(e) => Some(e),
            EngineError::Texture(e) => Some(e),
            EngineError::Mesh(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

impl From<CatalogError> for EngineError {
    fn from(e: CatalogError) -> Self {
        EngineError::Catalog(e)
    }
}

impl From<TextureError> for EngineError {
    fn from(e: TextureError) -> Self {
        EngineError::Texture(e)
    }
}

impl From<MeshError> for EngineError {
    fn from(e: MeshError) -> Self {
        EngineError::Mesh(e)
    }
}

pub struct Engine {
    config: Config,
    catalog: ShapeCatalog,
    light: BezierLight,
    mesh: Mesh,
    camera: OrbitCamera,
    renderer: Renderer,
    source: Option<SourceImage>,
    frame: u32,
    pub animate: bool,
}

impl Engine {
    /// Builds the whole scene from `config`, including the first light
    /// texture when a source image is configured.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        let catalog = ShapeCatalog::embedded()?;
        let light = BezierLight::new(&catalog, config.shape, &config.light);
        let mesh = match &config.mesh {
            Some(path) => Mesh::from_obj(path)?,
            None => Mesh::unit_quad(),
        };
        let source = config
            .texture
            .as_ref()
            .map(SourceImage::from_file)
            .transpose()?;

        let (width, height) = (config.window.width, config.window.height);
        let mut camera = OrbitCamera::new(width as f32 / height as f32);
        camera.orbit(START_FRAME);

        let mut engine = Self {
            animate: config.animate,
            catalog,
            light,
            mesh,
            camera,
            renderer: Renderer::new(width, height),
            source,
            frame: START_FRAME,
            config,
        };
        engine.rebuild_texture()?;
        Ok(engine)
    }

    /// Prefilters the source image for the current shape, if there is one.
    fn rebuild_texture(&mut self) -> Result<(), EngineError> {
        let Some(source) = &self.source else {
            self.light.clear_texture();
            return Ok(());
        };
        prefilter(&mut self.light, source, &self.config)
    }

    pub fn select_shape(&mut self, shape: ShapeId) -> Result<(), EngineError> {
        if shape == self.light.shape() {
            return Ok(());
        }
        self.light.set_shape(&self.catalog, shape);
        self.light.animate(self.frame);
        self.rebuild_texture()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.camera.set_aspect_ratio(width, height);
    }

    /// Places camera and light for the current frame, then advances the
    /// clock if animating.
    pub fn update(&mut self) {
        self.camera.orbit(self.frame);
        self.light.animate(self.frame);
        if self.animate {
            self.frame += 1;
        }
    }

    pub fn render(&mut self) {
        self.renderer.clear(colors::BACKGROUND);
        let view_projection = self.camera.view_projection();
        self.renderer
            .draw_light(&self.light, &self.mesh, view_projection);
    }

    /// ARGB8888 bytes of the last rendered frame.
    pub fn frame_buffer(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    /// Writes the last rendered frame as a PNG.
    pub fn save_frame<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        let path = path.as_ref();
        save_rgba8(
            path,
            self.renderer.width(),
            self.renderer.height(),
            self.renderer.to_rgba8(),
        )?;
        log::info!("frame saved to {}", path.display());
        Ok(())
    }

    /// A capture file name from the wall clock, e.g. `capture_1760000000.png`.
    pub fn capture_path() -> PathBuf {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        PathBuf::from(format!("capture_{secs}.png"))
    }

    pub fn light(&self) -> &BezierLight {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut BezierLight {
        &mut self.light
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn catalog(&self) -> &ShapeCatalog {
        &self.catalog
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }
}

/// Builds the texture for `light`'s current shape. With `dump_clipped` set,
/// the clipped level 0 is written out and then filtered, so the boundary is
/// only classified once.
fn prefilter(
    light: &mut BezierLight,
    source: &SourceImage,
    config: &Config,
) -> Result<(), EngineError> {
    let Some(path) = &config.dump_clipped else {
        light.build_texture(source, &config.filter)?;
        return Ok(());
    };
    let classifier = BoundaryClassifier::new(light.model_points());
    let clipped = clip_to_boundary(source, &classifier);
    clipped.save_png(path)?;
    log::info!("clipped light image written to {}", path.display());
    light.set_texture(LightTexture::from_clipped(clipped, &classifier, &config.filter)?);
    Ok(())
}

/// Builds the light texture for `config.shape` without any window and writes
/// level `n` to `out_dir/<shape>_lod<n>.png`. Returns the written paths,
/// finest level first.
pub fn bake(config: &Config, out_dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    config.validate()?;
    let Some(texture_path) = &config.texture else {
        return Err(ConfigError::Invalid("baking needs a texture".to_string()).into());
    };
    let catalog = ShapeCatalog::embedded()?;
    let source = SourceImage::from_file(texture_path)?;
    let mut light = BezierLight::new(&catalog, config.shape, &config.light);

    prefilter(&mut light, &source, config)?;
    let Some(texture) = light.texture() else {
        return Ok(Vec::new());
    };

    std::fs::create_dir_all(out_dir).map_err(|source| TextureError::Save {
        path: out_dir.to_path_buf(),
        source: image::ImageError::IoError(source),
    })?;
    let name = config.shape.name();
    let mut written = Vec::with_capacity(texture.levels().len());
    for lod in 0..=texture.max_lod() {
        let path = out_dir.join(format!("{name}_lod{lod}.png"));
        texture.save_level_png(lod, &path)?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    log::info!(
        "baked {} levels of {} into {}",
        written.len(),
        config.shape,
        out_dir.display()
    );
    Ok(written)
}
