//! Small geometric helpers shared by the mesh queries and the measurement tool.
//!
//! Points are plain [`glam::DVec3`] values; double precision keeps the
//! measurement tolerances (1e-7) meaningful on real-world scans.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A 3D coordinate.
pub type Point = DVec3;

/// An 8-bit RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Pure red, the default highlight color.
    pub const RED: Self = Self([255, 0, 0]);
    /// Light grey, the default surface color.
    pub const GREY: Self = Self([200, 200, 200]);

    /// Creates a color from its components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Returns the color as normalized floats, as renderers expect them.
    #[must_use]
    pub fn to_unit(self) -> DVec3 {
        DVec3::new(
            f64::from(self.0[0]) / 255.0,
            f64::from(self.0[1]) / 255.0,
            f64::from(self.0[2]) / 255.0,
        )
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self(value)
    }
}

/// Returns whether `p` lies on the segment `[a, b]` (within `eps`).
#[must_use]
pub fn is_in_segment(p: Point, a: Point, b: Point, eps: f64) -> bool {
    let ab = b - a;
    let len = ab.length();
    if len < eps {
        return p.distance(a) < eps;
    }
    let ap = p - a;
    if ab.cross(ap).length() / len > eps {
        return false;
    }
    let t = ap.dot(ab) / (len * len);
    (-eps..=1.0 + eps).contains(&t)
}

/// Finds the points with minimum and maximum projection onto `direction`.
///
/// Returns indices into `points`. Ties keep the first point encountered.
/// Returns `None` for an empty slice.
#[must_use]
pub fn find_extreme_points(points: &[Point], direction: DVec3) -> Option<(usize, usize)> {
    let first = points.first()?.dot(direction);
    let mut min = (0, first);
    let mut max = (0, first);
    for (i, p) in points.iter().enumerate().skip(1) {
        let t = p.dot(direction);
        if t < min.1 {
            min = (i, t);
        }
        if t > max.1 {
            max = (i, t);
        }
    }
    Some((min.0, max.0))
}

/// Returns the centroid of a point set, or `None` if it is empty.
#[must_use]
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum: DVec3 = points.iter().copied().sum();
    #[allow(clippy::cast_precision_loss)]
    Some(sum / points.len() as f64)
}
