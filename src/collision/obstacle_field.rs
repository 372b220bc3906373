//! The set of static obstacles a plan runs against

use crate::collision::obstacle::Obstacle;
use crate::collision::segment::Segment;
use crate::common::{Bounds2D, Point2D, RrtResult};

/// Ordered collection of non-overlapping obstacles
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        ObstacleField { obstacles }
    }

    /// Field with no obstacles
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from parsed vertex rings, validating each one
    pub fn from_rings(rings: Vec<Vec<Point2D>>) -> RrtResult<Self> {
        let obstacles = rings
            .into_iter()
            .map(Obstacle::new)
            .collect::<RrtResult<Vec<_>>>()?;
        Ok(Self::new(obstacles))
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Bounding box of every obstacle vertex, `None` for an empty field
    pub fn bounds(&self) -> Option<Bounds2D> {
        self.obstacles
            .iter()
            .map(|o| *o.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Whether `point` lies in free space
    pub fn is_valid(&self, point: &Point2D) -> bool {
        self.obstacle_containing(point).is_none()
    }

    /// Index of the first obstacle containing `point`
    pub fn obstacle_containing(&self, point: &Point2D) -> Option<usize> {
        self.obstacles.iter().position(|o| o.contains_point(point))
    }

    /// Whether `segment` crosses any obstacle boundary
    pub fn collides(&self, segment: &Segment) -> bool {
        self.obstacles.iter().any(|o| o.intersects(segment))
    }

    /// Shorthand for a collision test on the segment `from` → `to`
    pub fn collides_between(&self, from: &Point2D, to: &Point2D) -> bool {
        self.collides(&Segment::new(*from, *to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RrtError;

    fn field() -> ObstacleField {
        ObstacleField::from_rings(vec![
            vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(10.0, 10.0), Point2D::new(0.0, 10.0)],
            vec![Point2D::new(20.0, 20.0), Point2D::new(30.0, 20.0), Point2D::new(25.0, 30.0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_validity() {
        let field = field();
        assert!(!field.is_valid(&Point2D::new(5.0, 5.0)));
        assert!(!field.is_valid(&Point2D::new(25.0, 22.0)));
        assert!(field.is_valid(&Point2D::new(15.0, 15.0)));
        assert_eq!(field.obstacle_containing(&Point2D::new(25.0, 22.0)), Some(1));
    }

    #[test]
    fn test_collisions() {
        let field = field();
        assert!(field.collides_between(&Point2D::new(15.0, 25.0), &Point2D::new(35.0, 25.0)));
        assert!(!field.collides_between(&Point2D::new(15.0, 0.0), &Point2D::new(15.0, 40.0)));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(field().bounds(), Some(Bounds2D::new(0.0, 30.0, 0.0, 30.0)));
        assert!(ObstacleField::empty().bounds().is_none());
        assert!(ObstacleField::empty().is_valid(&Point2D::new(1.0, 1.0)));
    }

    #[test]
    fn test_malformed_ring_is_input_error() {
        let result = ObstacleField::from_rings(vec![vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]]);
        assert!(matches!(result, Err(RrtError::InvalidInput(_))));
    }
}
