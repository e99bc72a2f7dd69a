//! Plane cuts through the mesh surface.

use std::collections::HashSet;

use glam::DVec3;

use super::{Mesh, VertexId};
use crate::geometry::Point;

/// Tolerance below which a vertex counts as lying on the plane.
const ON_PLANE_EPS: f64 = 1e-12;

/// An oriented plane given by a point and a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuttingPlane {
    origin: Point,
    normal: DVec3,
}

impl CuttingPlane {
    /// Creates a plane through `origin`; returns `None` for a zero normal.
    pub fn new(origin: Point, normal: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self { origin, normal })
    }

    /// Returns the origin point of the plane.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the unit normal of the plane.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Returns the signed distance from a point to the plane.
    ///
    /// Positive values are on the side the normal points to.
    pub fn signed_distance(&self, point: Point) -> f64 {
        (point - self.origin).dot(self.normal)
    }

    /// Projects a point onto the plane.
    pub fn project(&self, point: Point) -> Point {
        point - self.signed_distance(point) * self.normal
    }
}

impl Mesh {
    /// Intersects the surface with a plane.
    ///
    /// Returns the crossing points in encounter order: triangles by id, then
    /// each triangle's edges in winding order. Vertices lying on the plane are
    /// reported once, as are edge crossings shared by two triangles.
    pub fn slice(&self, plane: &CuttingPlane) -> Vec<Point> {
        let distances: Vec<f64> = self
            .positions
            .iter()
            .map(|&p| plane.signed_distance(p))
            .collect();

        let mut seen_vertices: HashSet<VertexId> = HashSet::new();
        let mut seen_edges: HashSet<(VertexId, VertexId)> = HashSet::new();
        let mut points = Vec::new();

        for tri in &self.triangles {
            for i in 0..3 {
                let (a, b) = (tri[i], tri[(i + 1) % 3]);
                let (da, db) = (distances[a], distances[b]);
                if da.abs() <= ON_PLANE_EPS {
                    if seen_vertices.insert(a) {
                        points.push(self.positions[a]);
                    }
                } else if db.abs() > ON_PLANE_EPS
                    && (da < 0.0) != (db < 0.0)
                    && seen_edges.insert(super::geometry::sorted(a, b))
                {
                    let t = da / (da - db);
                    points.push(self.positions[a].lerp(self.positions[b], t));
                }
            }
        }
        points
    }
}
