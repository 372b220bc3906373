//! Common types used throughout polygon_rrt

use std::fmt::Debug;
use std::hash::Hash;

use nalgebra::{Vector2, Vector3};
use ordered_float::OrderedFloat;

/// A point in the planning state space.
///
/// Planners and the spatial index only look at the planar position; the
/// key is used for exact-value lookups in the path tree, so two
/// configurations share a key only when every component is equal.
pub trait Configuration: Copy + Debug + PartialEq {
    /// Exact-value lookup key
    type Key: Copy + Eq + Hash + Debug;

    /// Planar position of this configuration
    fn position(&self) -> Point2D;

    /// Lookup key built from the literal component values
    fn key(&self) -> Self::Key;
}

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Coordinate along a split axis (0 = x, 1 = y)
    pub fn coord(&self, axis: usize) -> f64 {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl Configuration for Point2D {
    type Key = [OrderedFloat<f64>; 2];

    fn position(&self) -> Point2D {
        *self
    }

    fn key(&self) -> Self::Key {
        [OrderedFloat(self.x), OrderedFloat(self.y)]
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn from_position(position: Point2D, yaw: f64) -> Self {
        Self { x: position.x, y: position.y, yaw }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.yaw)
    }
}

impl Configuration for Pose2D {
    type Key = [OrderedFloat<f64>; 3];

    fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    fn key(&self) -> Self::Key {
        [OrderedFloat(self.x), OrderedFloat(self.y), OrderedFloat(self.yaw)]
    }
}

impl From<Vector3<f64>> for Pose2D {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v[0], y: v[1], yaw: v[2] }
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Planar trace of any configuration sequence
    pub fn from_configurations<C: Configuration>(configurations: &[C]) -> Self {
        Self {
            points: configurations.iter().map(|c| c.position()).collect(),
        }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned bounds of a planar region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2D {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds2D {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Bounds2D { xmin, xmax, ymin, ymax }
    }

    /// Tight bounds around a set of points, `None` when the set is empty
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point2D>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds2D::new(p.x, p.x, p.y, p.y),
                Some(b) => b.including(p),
            })
        })
    }

    /// Smallest bounds containing `self` and `point`
    pub fn including(&self, point: &Point2D) -> Self {
        Bounds2D {
            xmin: self.xmin.min(point.x),
            xmax: self.xmax.max(point.x),
            ymin: self.ymin.min(point.y),
            ymax: self.ymax.max(point.y),
        }
    }

    /// Smallest bounds containing both
    pub fn union(&self, other: &Bounds2D) -> Self {
        Bounds2D {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Closed containment test
    pub fn contains(&self, point: &Point2D) -> bool {
        self.xmin <= point.x && point.x <= self.xmax && self.ymin <= point.y && point.y <= self.ymax
    }

    /// True when the two boxes share no point
    pub fn is_disjoint(&self, other: &Bounds2D) -> bool {
        other.xmax < self.xmin || other.xmin > self.xmax || other.ymax < self.ymin || other.ymin > self.ymax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_configuration_keys_are_exact() {
        let a = Point2D::new(0.1 + 0.2, 1.0);
        let b = Point2D::new(0.3, 1.0);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), Point2D::new(0.1 + 0.2, 1.0).key());

        let pose = Pose2D::new(1.0, 2.0, 0.5);
        assert_ne!(pose.key(), Pose2D::new(1.0, 2.0, 0.25).key());
        assert_eq!(pose.position(), Point2D::new(1.0, 2.0));
    }

    #[test]
    fn test_path2d_total_length() {
        let path = Path2D::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ]);
        assert!((path.total_length() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [Point2D::new(1.0, 5.0), Point2D::new(-2.0, 3.0), Point2D::new(4.0, -1.0)];
        let bounds = Bounds2D::from_points(&points).unwrap();
        assert_eq!(bounds, Bounds2D::new(-2.0, 4.0, -1.0, 5.0));
        assert!(bounds.contains(&Point2D::new(4.0, 5.0)));
        assert!(Bounds2D::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_disjoint() {
        let a = Bounds2D::new(0.0, 10.0, 0.0, 10.0);
        assert!(a.is_disjoint(&Bounds2D::new(11.0, 12.0, 0.0, 1.0)));
        assert!(!a.is_disjoint(&Bounds2D::new(10.0, 12.0, 5.0, 6.0)));
    }
}
