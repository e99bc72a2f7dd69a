//! Configuration options for meshnote.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Rgb;
use crate::mesh::MetricKind;

/// Configuration shared by the interaction tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Whether rectangle picks skip occluded vertices.
    pub visible_only: bool,

    /// Whether rectangle picks add to or remove from the selection.
    pub selection_mode: SelectionMode,

    /// Color of selected triangles.
    pub highlight_color: Rgb,

    /// Color of unselected triangles.
    pub base_color: Rgb,

    /// Gesture used by the triangle selection tool.
    pub triangle_selection: TriangleSelectionStyle,

    /// Metric for paths traced by the line tool.
    pub line_metric: MetricKind,

    /// Metric for contours traced by the triangle lasso.
    pub lasso_metric: MetricKind,

    /// Distances below this count as zero when measuring.
    pub measure_epsilon: f64,

    /// Whether measurement geometry is drawn over the mesh.
    pub draw_attributes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            visible_only: true,
            selection_mode: SelectionMode::Add,
            highlight_color: Rgb::RED,
            base_color: Rgb::GREY,
            triangle_selection: TriangleSelectionStyle::Rectangle,
            line_metric: MetricKind::Euclidean,
            lasso_metric: MetricKind::Combined { crease_weight: 1.0 },
            measure_epsilon: 1e-7,
            draw_attributes: true,
        }
    }
}

impl Options {
    /// Reads options from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes options to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// Effect of a rectangle pick on the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SelectionMode {
    /// Picked elements are selected.
    #[default]
    Add,
    /// Picked elements are deselected.
    Remove,
}

/// Gesture used to select triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TriangleSelectionStyle {
    /// Drag a screen rectangle.
    #[default]
    Rectangle,
    /// Click a contour, then grow the enclosed region.
    Lasso,
}
