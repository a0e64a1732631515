//! Axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

/// A point in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box accumulated from points.
///
/// A box with no points is invalid; its extents are meaningless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Point,
    max: Point,
    valid: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            valid: false,
        }
    }
}

impl BoundingBox {
    /// Creates an empty (invalid) box.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grows the box to contain `x`, `y`.
    pub fn add_point(&mut self, x: f64, y: f64) {
        self.min.x = self.min.x.min(x);
        self.min.y = self.min.y.min(y);
        self.max.x = self.max.x.max(x);
        self.max.y = self.max.y.max(y);
        self.valid = true;
    }

    /// Grows the box to contain another box. Invalid boxes are ignored.
    pub fn merge(&mut self, other: &Self) {
        if other.valid {
            self.add_point(other.min.x, other.min.y);
            self.add_point(other.max.x, other.max.y);
        }
    }

    /// Whether any geometry was added.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Lower-left corner.
    #[must_use]
    pub const fn min(&self) -> Point {
        self.min
    }

    /// Upper-right corner.
    #[must_use]
    pub const fn max(&self) -> Point {
        self.max
    }

    /// Width along X (0 when invalid).
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.valid {
            self.max.x - self.min.x
        } else {
            0.0
        }
    }

    /// Height along Y (0 when invalid).
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.valid {
            self.max.y - self.min.y
        } else {
            0.0
        }
    }

    /// Centre point (origin when invalid).
    #[must_use]
    pub fn center(&self) -> Point {
        if self.valid {
            Point::new(
                (self.min.x + self.max.x) / 2.0,
                (self.min.y + self.max.y) / 2.0,
            )
        } else {
            Point::default()
        }
    }
}
