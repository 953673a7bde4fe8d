//! Closed composite cubic-Bezier boundaries.
//!
//! A shape is an ordered list of cubic segments in normalized model space
//! `[-1, 1]^2` (z = 0). Consecutive segments share an endpoint and the last
//! segment ends where the first one starts, so the boundary is a closed loop.
//! The named shapes live in a data table, see [`catalog`].

pub mod catalog;

use std::fmt;

use crate::bezier::{self, NUM_CPS_IN_CURVE};
use crate::math::vec3::Vec3;

pub use catalog::ShapeCatalog;

/// Boundary samples taken per curve for the stencil polygon.
pub const SAMPLE_SPLIT: usize = 32;

/// Identifier of one of the named catalog shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ShapeId {
    Teardrop = 0,
    Torch = 1,
    Tripod = 2,
    #[default]
    Rainbow = 3,
    Cavity = 4,
    Camel = 5,
    Quad = 6,
    Char = 7,
}

impl ShapeId {
    pub const ALL: [ShapeId; 8] = [
        ShapeId::Teardrop,
        ShapeId::Torch,
        ShapeId::Tripod,
        ShapeId::Rainbow,
        ShapeId::Cavity,
        ShapeId::Camel,
        ShapeId::Quad,
        ShapeId::Char,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeId::Teardrop => "teardrop",
            ShapeId::Torch => "torch",
            ShapeId::Tripod => "tripod",
            ShapeId::Rainbow => "rainbow",
            ShapeId::Cavity => "cavity",
            ShapeId::Camel => "camel",
            ShapeId::Quad => "quad",
            ShapeId::Char => "char",
        }
    }

    /// Parses either a shape name or its numeric id.
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(index) = text.parse::<usize>() {
            return Self::from_index(index);
        }
        Self::ALL.iter().copied().find(|id| id.name() == text)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.index())
    }
}

impl serde::Serialize for ShapeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for ShapeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ShapeId::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown shape `{text}`")))
    }
}

/// Why a segment list does not form a valid closed boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    Empty,
    /// `segment` does not start where the previous one ended (or, for
    /// segment 0, where the last one ended).
    OpenLoop { segment: usize },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::Empty => write!(f, "shape has no curve segments"),
            ShapeError::OpenLoop { segment } => {
                write!(f, "segment {segment} does not continue the previous segment")
            }
        }
    }
}

impl std::error::Error for ShapeError {}

/// Control points of a closed boundary, four per cubic segment.
///
/// Never mutated in place: selecting another shape builds a new set.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoints {
    segments: Vec<[Vec3; NUM_CPS_IN_CURVE]>,
}

impl ControlPoints {
    /// Validates the closed-loop invariant and wraps the segments.
    pub fn new(segments: Vec<[Vec3; NUM_CPS_IN_CURVE]>) -> Result<Self, ShapeError> {
        if segments.is_empty() {
            return Err(ShapeError::Empty);
        }
        let count = segments.len();
        for i in 0..count {
            let prev = &segments[(i + count - 1) % count];
            if prev[NUM_CPS_IN_CURVE - 1] != segments[i][0] {
                return Err(ShapeError::OpenLoop { segment: i });
            }
        }
        Ok(Self { segments })
    }

    /// All control points in order; `len() == 4 * num_curves()`.
    pub fn points(&self) -> &[Vec3] {
        self.segments.as_flattened()
    }

    pub fn segments(&self) -> &[[Vec3; NUM_CPS_IN_CURVE]] {
        &self.segments
    }

    pub fn num_points(&self) -> usize {
        self.segments.len() * NUM_CPS_IN_CURVE
    }

    pub fn num_curves(&self) -> usize {
        self.segments.len()
    }

    /// Evaluates curve `curve` at parameter `t`.
    pub fn curve_point(&self, curve: usize, t: f32) -> Vec3 {
        bezier::evaluate(&self.segments[curve], t)
    }

    /// Mean of all control points, shared endpoints counted once per segment.
    pub fn centroid(&self) -> Vec3 {
        let n = self.num_points() as f32;
        let mut center = Vec3::ZERO;
        for p in self.points() {
            center += *p / n;
        }
        center
    }

    /// Closed polyline for the stencil triangle fan.
    ///
    /// Layout: the origin (fan hub), then `n_split` samples per curve at
    /// `t = j / n_split`, then the first boundary sample again to close the
    /// fan. Length is `num_curves * n_split + 2`.
    pub fn sample_boundary(&self, n_split: usize) -> Vec<Vec3> {
        let mut samples = Vec::with_capacity(self.num_curves() * n_split + 2);
        samples.push(Vec3::ZERO);
        for segment in &self.segments {
            for j in 0..n_split {
                let t = j as f32 / n_split as f32;
                samples.push(bezier::evaluate_bernstein(segment, t as f64));
            }
        }
        samples.push(samples[1]);
        samples
    }
}
