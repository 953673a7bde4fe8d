//! The named shape table.
//!
//! Shapes are data, not code: `assets/shapes.json` is embedded into the binary
//! and parsed once by [`ShapeCatalog::embedded`]. Every entry lists its cubic
//! segments as four `[x, y]` points in `[-1, 1]` model space, optionally
//! multiplied by a per-shape `scale`.

use std::fmt;

use serde::Deserialize;

use super::{ControlPoints, ShapeError, ShapeId};
use crate::bezier::NUM_CPS_IN_CURVE;
use crate::math::vec3::Vec3;

/// Format version understood by this loader.
pub const CATALOG_VERSION: u32 = 1;

const EMBEDDED_CATALOG: &str = include_str!("../../assets/shapes.json");

#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
    UnsupportedVersion(u32),
    UnknownShape(usize),
    DuplicateShape(ShapeId),
    MissingShape(ShapeId),
    BadSegment { shape: ShapeId, segment: usize, points: usize },
    Shape { shape: ShapeId, source: ShapeError },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "malformed shape catalog: {e}"),
            CatalogError::UnsupportedVersion(v) => {
                write!(f, "shape catalog version {v} is not supported (expected {CATALOG_VERSION})")
            }
            CatalogError::UnknownShape(id) => write!(f, "shape id {id} is out of range"),
            CatalogError::DuplicateShape(id) => write!(f, "shape {id} is defined twice"),
            CatalogError::MissingShape(id) => write!(f, "shape {id} is missing"),
            CatalogError::BadSegment {
                shape,
                segment,
                points,
            } => write!(
                f,
                "shape {shape}, segment {segment}: expected {NUM_CPS_IN_CURVE} points, found {points}"
            ),
            CatalogError::Shape { shape, source } => write!(f, "shape {shape}: {source}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Parse(e) => Some(e),
            CatalogError::Shape { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

#[derive(Deserialize)]
struct RawCatalog {
    version: u32,
    shapes: Vec<RawShape>,
}

#[derive(Deserialize)]
struct RawShape {
    id: usize,
    name: String,
    #[serde(default = "unit_scale")]
    scale: f32,
    segments: Vec<Vec<[f32; 2]>>,
}

fn unit_scale() -> f32 {
    1.0
}

/// One named shape of the catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: ShapeId,
    pub name: String,
    pub control_points: ControlPoints,
}

/// All named shapes, indexed by [`ShapeId`].
#[derive(Debug, Clone)]
pub struct ShapeCatalog {
    entries: Vec<CatalogEntry>,
}

impl ShapeCatalog {
    /// Parses the catalog compiled into the crate.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parses and validates a catalog document.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(text)?;
        if raw.version != CATALOG_VERSION {
            return Err(CatalogError::UnsupportedVersion(raw.version));
        }

        let mut slots: Vec<Option<CatalogEntry>> = vec![None; ShapeId::ALL.len()];
        for shape in raw.shapes {
            let id = ShapeId::from_index(shape.id).ok_or(CatalogError::UnknownShape(shape.id))?;
            if slots[id.index()].is_some() {
                return Err(CatalogError::DuplicateShape(id));
            }
            let control_points = build_control_points(id, &shape)?;
            slots[id.index()] = Some(CatalogEntry {
                id,
                name: shape.name,
                control_points,
            });
        }

        let entries = slots
            .into_iter()
            .zip(ShapeId::ALL)
            .map(|(slot, id)| slot.ok_or(CatalogError::MissingShape(id)))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("loaded {} catalog shapes", entries.len());
        Ok(Self { entries })
    }

    pub fn entry(&self, id: ShapeId) -> &CatalogEntry {
        &self.entries[id.index()]
    }

    /// A fresh copy of the control points of `id`.
    pub fn control_points(&self, id: ShapeId) -> ControlPoints {
        self.entry(id).control_points.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}

fn build_control_points(id: ShapeId, shape: &RawShape) -> Result<ControlPoints, CatalogError> {
    let mut segments = Vec::with_capacity(shape.segments.len());
    for (index, raw) in shape.segments.iter().enumerate() {
        let points: [[f32; 2]; NUM_CPS_IN_CURVE] =
            raw.as_slice()
                .try_into()
                .map_err(|_| CatalogError::BadSegment {
                    shape: id,
                    segment: index,
                    points: raw.len(),
                })?;
        segments.push(points.map(|[x, y]| Vec3::new(x, y, 0.0) * shape.scale));
    }
    ControlPoints::new(segments).map_err(|source| CatalogError::Shape { shape: id, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_embedded_catalog_is_complete() {
        let catalog = ShapeCatalog::embedded().unwrap();
        for id in ShapeId::ALL {
            let entry = catalog.entry(id);
            assert_eq!(entry.id, id);
            assert_eq!(entry.name, id.name());
        }
    }

    #[test]
    fn test_every_shape_is_a_closed_loop() {
        let catalog = ShapeCatalog::embedded().unwrap();
        for entry in catalog.iter() {
            let points = entry.control_points.points();
            assert_eq!(points.len() % NUM_CPS_IN_CURVE, 0, "{}", entry.name);
            assert_eq!(points[0], points[points.len() - 1], "{}", entry.name);
            for pair in entry.control_points.segments().windows(2) {
                assert_eq!(pair[0][3], pair[1][0], "{}", entry.name);
            }
        }
    }

    #[test]
    fn test_curve_counts() {
        let catalog = ShapeCatalog::embedded().unwrap();
        let counts: Vec<usize> = catalog
            .iter()
            .map(|e| e.control_points.num_curves())
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 7, 3, 4, 12]);
    }

    #[test]
    fn test_scale_is_applied() {
        let catalog = ShapeCatalog::embedded().unwrap();
        let torch = catalog.control_points(ShapeId::Torch);
        assert_relative_eq!(torch.points()[0].x, -0.8 * 0.9);
        assert_relative_eq!(torch.points()[1].y, 1.4 * 0.9);
    }

    #[test]
    fn test_quad_centroid_is_origin() {
        let catalog = ShapeCatalog::embedded().unwrap();
        let c = catalog.control_points(ShapeId::Quad).centroid();
        assert_relative_eq!(c.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(c.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let err = ShapeCatalog::from_json(r#"{"version": 2, "shapes": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_rejects_short_segment() {
        let text = r#"{"version": 1, "shapes": [
            {"id": 0, "name": "bad", "segments": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]}
        ]}"#;
        let err = ShapeCatalog::from_json(text).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::BadSegment {
                segment: 0,
                points: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_missing_shapes() {
        let text = r#"{"version": 1, "shapes": [
            {"id": 6, "name": "quad", "segments": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
        ]}"#;
        let err = ShapeCatalog::from_json(text).unwrap_err();
        assert!(matches!(err, CatalogError::MissingShape(ShapeId::Teardrop)));
    }
}
