#![forbid(unsafe_code)]

//! Geometric primitives in continuous coordinates.
//!
//! The host toolkit owns layout; this framework only reasons about frames,
//! centers, and insets, so everything here is plain f64 data with the
//! handful of operations the transition and snapping math needs.

/// A point in container coordinates (origin at top-left, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin (0, 0).
    pub const ZERO: Point = Point::new(0.0, 0.0);
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A zero size.
    pub const ZERO: Size = Size::new(0.0, 0.0);

    /// Check if either dimension is non-positive.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A 2D vector, used for gesture velocity and translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// The zero vector.
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);
}

/// Edge insets (safe area, layout margins).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    /// Create insets with explicit edges.
    #[inline]
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Zero insets on every edge.
    pub const ZERO: EdgeInsets = EdgeInsets::new(0.0, 0.0, 0.0, 0.0);

    /// Uniform insets on every edge.
    #[inline]
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a rectangle from edges and dimensions.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Create a rectangle from an origin and size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// An empty rectangle at the origin.
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    /// Left edge.
    #[inline]
    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    /// Top edge.
    #[inline]
    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    /// Right edge.
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    /// Bottom edge.
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Horizontal midpoint.
    #[inline]
    pub fn mid_x(&self) -> f64 {
        self.origin.x + self.size.width / 2.0
    }

    /// Vertical midpoint.
    #[inline]
    pub fn mid_y(&self) -> f64 {
        self.origin.y + self.size.height / 2.0
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check if a point lies inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// Shrink the rectangle by per-edge insets.
    ///
    /// Width/height never go below zero.
    pub fn inset_by(&self, insets: EdgeInsets) -> Rect {
        Rect::new(
            self.origin.x + insets.left,
            self.origin.y + insets.top,
            (self.size.width - insets.left - insets.right).max(0.0),
            (self.size.height - insets.top - insets.bottom).max(0.0),
        )
    }

    /// Return a copy of the rectangle with its center moved to `center`.
    pub fn with_center(&self, center: Point) -> Rect {
        Rect::new(
            center.x - self.size.width / 2.0,
            center.y - self.size.height / 2.0,
            self.size.width,
            self.size.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_center() {
        let rect = Rect::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(rect.min_x(), 10.0);
        assert_eq!(rect.min_y(), 20.0);
        assert_eq!(rect.max_x(), 110.0);
        assert_eq!(rect.max_y(), 60.0);
        assert_eq!(rect.mid_x(), 60.0);
        assert_eq!(rect.mid_y(), 40.0);
        assert_eq!(rect.center(), Point::new(60.0, 40.0));
    }

    #[test]
    fn rect_contains_excludes_far_edges() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
        assert!(!rect.contains(Point::new(5.0, 10.0)));
    }

    #[test]
    fn rect_inset_by_clamps_to_zero() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inset = rect.inset_by(EdgeInsets::uniform(20.0));
        assert!(inset.is_empty());
        assert_eq!(inset.size.width, 0.0);
        assert_eq!(inset.size.height, 0.0);
    }

    #[test]
    fn rect_inset_by_applies_each_edge() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inset = rect.inset_by(EdgeInsets::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(inset.min_x(), 20.0);
        assert_eq!(inset.min_y(), 10.0);
        assert_eq!(inset.size.width, 40.0);
        assert_eq!(inset.size.height, 60.0);
    }

    #[test]
    fn rect_with_center_preserves_size() {
        let rect = Rect::new(0.0, 0.0, 100.0, 140.0);
        let moved = rect.with_center(Point::new(50.0, 70.0));
        assert_eq!(moved.origin, Point::ZERO);
        assert_eq!(moved.size, rect.size);
        assert_eq!(moved.center(), Point::new(50.0, 70.0));
    }

    #[test]
    fn size_is_empty() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(-1.0, 10.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }
}
