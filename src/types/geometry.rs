//! Points, rectangles and angle helpers used by the object model

use std::fmt;

/// Tolerance used when comparing coordinates and angles.
pub const EPSILON: f64 = 1e-6;

/// Whether a value is zero within [`EPSILON`].
#[inline]
pub fn almost_zero(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_deg_angle(deg: f64) -> f64 {
    let mut angle = deg % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}

/// Convert degrees to radians, normalizing first.
pub fn deg_to_rad(deg: f64) -> f64 {
    normalize_deg_angle(deg).to_radians()
}

/// A 2D point in document units (points, 1/72 inch)
#[derive(Debug, Clone, Copy, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Translate by `(dx, dy)`.
    pub fn moved(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate around `center` by `degrees` (counter-clockwise in a y-down
    /// coordinate system for positive values).
    pub fn rotate_deg(&self, degrees: f64, center: Point) -> Point {
        if almost_zero(degrees) {
            return *self;
        }
        let rotation = deg_to_rad(degrees);
        let (sin, cos) = rotation.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(dx * cos - dy * sin + center.x, dy * cos + dx * sin + center.y)
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        almost_zero(self.x - other.x) && almost_zero(self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle stored as its four edges.
///
/// Used both as an object bounding box and as a set of margins or insets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Rect {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Rect {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        self.top_left().moved(self.width() / 2.0, self.height() / 2.0)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.right, self.top)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right, self.bottom)
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.left, self.bottom)
    }

    /// Move every edge inwards by `diff`.
    pub fn shrink(&self, diff: f64) -> Rect {
        Rect::new(
            self.top + diff,
            self.right - diff,
            self.bottom - diff,
            self.left + diff,
        )
    }
}
