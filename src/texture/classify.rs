//! Inside/outside classification and exterior distance for light texels.
//!
//! The shape's control points live in `[-1, 1]` model space; the light
//! texture covers that square, so a curve point `p` maps to texture UV
//! `0.5 * p + 0.5`. Texel `(col, row)` sits at
//! `u = col / (w - 1)`, `v = 1 - row / (h - 1)`: row 0 is the top edge, `v = 1`.

use crate::math::vec2::Vec2;
use crate::shape::ControlPoints;

/// Boundary steps per curve for the turning-angle test.
pub const WINDING_STEPS: usize = 32;

/// Boundary samples per curve for the distance search.
pub const DISTANCE_STEPS: usize = 64;

/// Added to the product of edge lengths before dividing, so texels lying on
/// a boundary sample do not divide by zero.
const LENGTH_EPSILON: f32 = 0.00001;

/// Which side of the boundary a texel is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Inside,
    /// Distance to the boundary in level-0 texels, at least 1.
    Outside { distance: u32 },
}

/// Precomputed boundary samples of one shape in texture UV space.
#[derive(Debug, Clone)]
pub struct BoundaryClassifier {
    /// Per curve, `WINDING_STEPS + 1` points from `t = 0` to `t = 1`.
    winding_paths: Vec<Vec<Vec2>>,
    /// Per curve, `DISTANCE_STEPS` points from `t = 0` up to (excluding) `t = 1`.
    distance_samples: Vec<Vec2>,
}

impl BoundaryClassifier {
    pub fn new(control_points: &ControlPoints) -> Self {
        let to_uv = |curve: usize, t: f32| {
            let p = control_points.curve_point(curve, t).xy() * 0.5;
            p + Vec2::new(0.5, 0.5)
        };

        let winding_dt = 1.0 / WINDING_STEPS as f32;
        let winding_paths = (0..control_points.num_curves())
            .map(|curve| {
                let mut path = Vec::with_capacity(WINDING_STEPS + 1);
                path.push(to_uv(curve, 0.0));
                for div in 0..WINDING_STEPS {
                    path.push(to_uv(curve, (div + 1) as f32 * winding_dt));
                }
                path
            })
            .collect();

        let distance_dt = 1.0 / DISTANCE_STEPS as f32;
        let distance_samples = (0..control_points.num_curves())
            .flat_map(|curve| {
                (0..DISTANCE_STEPS).map(move |div| to_uv(curve, div as f32 * distance_dt))
            })
            .collect();

        Self {
            winding_paths,
            distance_samples,
        }
    }

    /// UV coordinate of texel `(col, row)` in a `width x height` image.
    pub fn texel_uv(col: u32, row: u32, width: u32, height: u32) -> Vec2 {
        let du = width.saturating_sub(1).max(1) as f32;
        let dv = height.saturating_sub(1).max(1) as f32;
        Vec2::new(col as f32 / du, 1.0 - row as f32 / dv)
    }

    /// Signed total turning angle of the boundary as seen from `uv`.
    ///
    /// Each boundary step contributes the unsigned angle between the vectors
    /// to its two ends, signed by whether it turns the same way as the very
    /// first step of the first curve. Roughly `±2π` inside, `0` outside.
    pub fn winding_angle(&self, uv: Vec2) -> f32 {
        let mut reference = 0.0f32;
        let mut sum_angle = 0.0f32;
        for (curve, path) in self.winding_paths.iter().enumerate() {
            let mut e0 = path[0] - uv;
            for (div, &v1) in path[1..].iter().enumerate() {
                let e1 = v1 - uv;
                let crs = e0.cross(e1);
                let sign = if curve == 0 && div == 0 {
                    reference = crs;
                    1.0
                } else {
                    sign_of(crs * reference)
                };

                let l0l1 = e0.magnitude() * e1.magnitude() + LENGTH_EPSILON;
                let angle = (e0.dot(e1) / l0l1).clamp(-1.0, 1.0).acos();
                sum_angle += sign * angle;

                e0 = e1;
            }
        }
        sum_angle
    }

    /// A texel is inside iff its absolute turning angle reaches π.
    pub fn is_inside(&self, uv: Vec2) -> bool {
        (self.winding_angle(uv).abs() as f64) >= std::f64::consts::PI
    }

    /// Distance from `uv` to the sampled boundary, in texels of a texture
    /// `width` texels wide: `trunc(width * |uv - p|) + 1`, minimized over all
    /// samples `p`.
    pub fn exterior_distance(&self, uv: Vec2, width: u32) -> u32 {
        self.distance_samples
            .iter()
            .map(|&p| (width as f32 * (uv - p).magnitude()) as u32 + 1)
            .min()
            .unwrap_or(u32::MAX)
    }

    /// Full classification of a single texel.
    pub fn classify(&self, uv: Vec2, width: u32) -> Region {
        if self.is_inside(uv) {
            Region::Inside
        } else {
            Region::Outside {
                distance: self.exterior_distance(uv, width),
            }
        }
    }
}

/// -1, 0 or 1. Unlike `f32::signum`, zero maps to zero.
#[inline]
fn sign_of(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{ShapeCatalog, ShapeId};
    use std::f32::consts::TAU;

    fn classifier(id: ShapeId) -> (BoundaryClassifier, ControlPoints) {
        let catalog = ShapeCatalog::embedded().unwrap();
        let cps = catalog.control_points(id);
        (BoundaryClassifier::new(&cps), cps)
    }

    fn centroid_uv(cps: &ControlPoints) -> Vec2 {
        cps.centroid().xy() * 0.5 + Vec2::new(0.5, 0.5)
    }

    #[test]
    fn test_texel_uv_corners() {
        assert_eq!(BoundaryClassifier::texel_uv(0, 0, 64, 64), Vec2::new(0.0, 1.0));
        assert_eq!(BoundaryClassifier::texel_uv(63, 63, 64, 64), Vec2::new(1.0, 0.0));
        assert_eq!(BoundaryClassifier::texel_uv(0, 0, 1, 1), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_teardrop_centroid_is_inside() {
        let (classifier, cps) = classifier(ShapeId::Teardrop);
        let uv = centroid_uv(&cps);
        assert!(classifier.is_inside(uv));
        assert!((classifier.winding_angle(uv).abs() - TAU).abs() < 0.1);
    }

    #[test]
    fn test_corner_is_outside() {
        for id in [ShapeId::Teardrop, ShapeId::Rainbow, ShapeId::Char] {
            let (classifier, _) = classifier(id);
            assert!(!classifier.is_inside(Vec2::new(0.0, 0.0)), "{id}");
            assert!(classifier.winding_angle(Vec2::new(0.0, 0.0)).abs() < 1.0);
        }
    }

    #[test]
    fn test_tripod_center_is_inside() {
        let (classifier, _) = classifier(ShapeId::Tripod);
        assert!(classifier.is_inside(Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn test_distance_is_at_least_one() {
        let (classifier, cps) = classifier(ShapeId::Quad);
        let on_boundary = cps.points()[0].xy() * 0.5 + Vec2::new(0.5, 0.5);
        assert_eq!(classifier.exterior_distance(on_boundary, 64), 1);
    }

    #[test]
    fn test_distance_is_monotone_moving_away() {
        let (classifier, _) = classifier(ShapeId::Teardrop);
        // The teardrop tip sits at model (0, 0.65), UV (0.5, 0.825); walk straight up.
        let mut previous = 0;
        for step in 0..40 {
            let uv = Vec2::new(0.5, 0.825 + step as f32 * 0.004);
            let d = classifier.exterior_distance(uv, 256);
            assert!(d >= previous, "distance dropped at step {step}");
            previous = d;
        }
        assert!(previous > 30);
    }

    #[test]
    fn test_classify_reports_distance_outside() {
        let (classifier, _) = classifier(ShapeId::Teardrop);
        match classifier.classify(Vec2::new(0.5, 1.0), 64) {
            Region::Outside { distance } => {
                // tip at v = 0.825 -> 0.175 * 64 = 11.2 texels
                assert_eq!(distance, 12);
            }
            Region::Inside => panic!("texel above the tip must be outside"),
        }
    }
}
