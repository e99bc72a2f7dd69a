//! Picking interface between the interaction tools and a renderer.
//!
//! Tools never talk to a graphics API directly. They ask a [`PickBackend`]
//! to turn screen coordinates into world points, triangle hits or the
//! vertices inside a screen rectangle.

use std::collections::HashMap;

use glam::{DVec2, DVec3};

use crate::geometry::Point;
use crate::mesh::VertexId;

/// A triangle hit reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHit {
    /// Raw cell id; may be negative or out of range and must be validated.
    pub cell: i64,
    /// The world position of the pick point.
    pub position: Point,
}

/// An axis-aligned screen rectangle built from two drag corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: DVec2,
    pub max: DVec2,
}

impl ScreenRect {
    /// Creates a rectangle from any two opposite corners.
    #[must_use]
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns whether a screen point lies inside, borders included.
    #[must_use]
    pub fn contains(&self, p: DVec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Screen-space queries against the rendered mesh.
pub trait PickBackend {
    /// Returns the surface point under the cursor, if any.
    fn pick_world_point(&self, screen: DVec2) -> Option<Point>;

    /// Returns the triangle under the cursor, if any.
    fn pick_cell(&self, screen: DVec2) -> Option<CellHit>;

    /// Returns the vertices projected inside `rect`.
    ///
    /// With `visible_only`, occluded vertices are left out.
    fn pick_frustum(&self, rect: ScreenRect, visible_only: bool) -> Vec<VertexId>;

    /// Unprojects a screen point onto the focal plane, hit or not.
    fn display_to_world(&self, screen: DVec2) -> Point;

    /// Returns the camera view-plane normal.
    fn view_direction(&self) -> DVec3;
}

/// A backend answering from scripted tables, for headless use and tests.
///
/// Screen coordinates are matched exactly, after rounding to integers.
/// `display_to_world` maps `(x, y)` to `(x, y, 0)` unless overridden.
#[derive(Debug, Clone)]
pub struct ScriptedPicker {
    world_points: HashMap<(i64, i64), Point>,
    cells: HashMap<(i64, i64), CellHit>,
    display_points: HashMap<(i64, i64), Point>,
    vertex_screen: Vec<(VertexId, DVec2, bool)>,
    view_direction: DVec3,
}

impl Default for ScriptedPicker {
    fn default() -> Self {
        Self {
            world_points: HashMap::new(),
            cells: HashMap::new(),
            display_points: HashMap::new(),
            vertex_screen: Vec::new(),
            view_direction: DVec3::NEG_Z,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn key(screen: DVec2) -> (i64, i64) {
    (screen.x.round() as i64, screen.y.round() as i64)
}

impl ScriptedPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a surface hit: both the world point and the triangle.
    pub fn with_hit(mut self, screen: DVec2, cell: i64, position: Point) -> Self {
        self.world_points.insert(key(screen), position);
        self.cells.insert(key(screen), CellHit { cell, position });
        self
    }

    /// Scripts a world point without a triangle.
    pub fn with_world_point(mut self, screen: DVec2, position: Point) -> Self {
        self.world_points.insert(key(screen), position);
        self
    }

    /// Scripts the unprojection of a screen point.
    pub fn with_display_point(mut self, screen: DVec2, position: Point) -> Self {
        self.display_points.insert(key(screen), position);
        self
    }

    /// Places a vertex on screen for rectangle picks.
    pub fn with_vertex(mut self, vertex: VertexId, screen: DVec2, visible: bool) -> Self {
        self.vertex_screen.push((vertex, screen, visible));
        self
    }

    /// Projects mesh positions orthographically along -Z, all visible.
    pub fn with_orthographic_vertices(mut self, positions: &[Point]) -> Self {
        for (v, p) in positions.iter().enumerate() {
            self.vertex_screen.push((v, p.truncate(), true));
        }
        self
    }

    pub fn with_view_direction(mut self, direction: DVec3) -> Self {
        self.view_direction = direction;
        self
    }
}

impl PickBackend for ScriptedPicker {
    fn pick_world_point(&self, screen: DVec2) -> Option<Point> {
        self.world_points.get(&key(screen)).copied()
    }

    fn pick_cell(&self, screen: DVec2) -> Option<CellHit> {
        self.cells.get(&key(screen)).copied()
    }

    fn pick_frustum(&self, rect: ScreenRect, visible_only: bool) -> Vec<VertexId> {
        self.vertex_screen
            .iter()
            .filter(|(_, s, visible)| rect.contains(*s) && (*visible || !visible_only))
            .map(|(v, _, _)| *v)
            .collect()
    }

    fn display_to_world(&self, screen: DVec2) -> Point {
        self.display_points
            .get(&key(screen))
            .copied()
            .unwrap_or_else(|| screen.extend(0.0))
    }

    fn view_direction(&self) -> DVec3 {
        self.view_direction
    }
}
