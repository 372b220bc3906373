//! Polygonal obstacles

use itertools::Itertools;

use crate::collision::segment::Segment;
use crate::common::{Bounds2D, Point2D, RrtError, RrtResult};

/// How far past the obstacle's right edge the containment ray extends
const RAY_MARGIN: f64 = 5.0;

/// Closed polygon given as a vertex ring
#[derive(Debug, Clone)]
pub struct Obstacle {
    vertices: Vec<Point2D>,
    edges: Vec<Segment>,
    bounds: Bounds2D,
}

impl Obstacle {
    /// Build an obstacle from its vertex ring.
    ///
    /// The ring is implicitly closed; a trailing copy of the first vertex and
    /// consecutive duplicates are dropped. At least three distinct finite
    /// vertices are required.
    pub fn new(vertices: Vec<Point2D>) -> RrtResult<Self> {
        if let Some(p) = vertices.iter().find(|p| !p.is_finite()) {
            return Err(RrtError::InvalidInput(format!(
                "obstacle vertex ({}, {}) is not finite",
                p.x, p.y
            )));
        }

        let mut ring: Vec<Point2D> = vertices.into_iter().dedup().collect();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(RrtError::InvalidInput(format!(
                "obstacle needs at least 3 distinct vertices, got {}",
                ring.len()
            )));
        }

        let edges = ring
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| Segment::new(*a, *b))
            .collect();
        let bounds = match Bounds2D::from_points(&ring) {
            Some(bounds) => bounds,
            None => return Err(RrtError::InvalidInput("obstacle has no vertices".to_string())),
        };

        Ok(Obstacle {
            vertices: ring,
            edges,
            bounds,
        })
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Boundary segments, one per vertex, closing edge last
    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    pub fn bounds(&self) -> &Bounds2D {
        &self.bounds
    }

    /// Ray-casting containment test.
    ///
    /// Points on the boundary count as inside.
    pub fn contains_point(&self, point: &Point2D) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }

        let ray = Segment::new(*point, Point2D::new(self.bounds.xmax + RAY_MARGIN, point.y));
        let mut crossings = 0usize;

        for edge in &self.edges {
            if edge.contains_point(point) {
                return true;
            }
            if edge.intersects(&ray) {
                crossings += 1;
            }
        }

        crossings % 2 == 1
    }

    /// Whether `segment` crosses the obstacle boundary
    pub fn intersects(&self, segment: &Segment) -> bool {
        if self.bounds.is_disjoint(&segment.bounds()) {
            return false;
        }
        self.edges.iter().any(|edge| edge.intersects(segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn polygon(points: &[(f64, f64)]) -> Obstacle {
        Obstacle::new(points.iter().map(|&p| Point2D::from(p)).collect()).unwrap()
    }

    /// Plain crossing-number test
    fn reference_contains(vertices: &[Point2D], p: &Point2D) -> bool {
        let mut inside = false;
        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (a, b) = (vertices[i], vertices[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn distance_to_segment(p: &Point2D, s: &Segment) -> f64 {
        let (dx, dy) = (s.end.x - s.start.x, s.end.y - s.start.y);
        let t = (((p.x - s.start.x) * dx + (p.y - s.start.y) * dy) / (dx * dx + dy * dy)).clamp(0.0, 1.0);
        p.distance(&Point2D::new(s.start.x + t * dx, s.start.y + t * dy))
    }

    #[test]
    fn test_ring_is_closed() {
        let square = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert_eq!(square.edges().len(), 4);
        assert_eq!(square.edges()[3].end, Point2D::new(0.0, 0.0));

        let explicit = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        assert_eq!(explicit.vertices().len(), 3);
    }

    #[test]
    fn test_degenerate_rings_rejected() {
        let two = Obstacle::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)]);
        assert!(matches!(two, Err(RrtError::InvalidInput(_))));

        let nan = Obstacle::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(f64::NAN, 1.0),
            Point2D::new(1.0, 0.0),
        ]);
        assert!(nan.is_err());
    }

    #[test]
    fn test_square_containment() {
        let square = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(square.contains_point(&Point2D::new(5.0, 5.0)));
        assert!(square.contains_point(&Point2D::new(0.5, 9.5)));
        assert!(!square.contains_point(&Point2D::new(15.0, 5.0)));
        assert!(!square.contains_point(&Point2D::new(-0.1, 5.0)));
        // On the boundary counts as inside
        assert!(square.contains_point(&Point2D::new(0.0, 5.0)));
        assert!(square.contains_point(&Point2D::new(4.0, 0.0)));
    }

    #[test]
    fn test_non_convex_containment() {
        // L shape: notch cut out of the upper right
        let l_shape = polygon(&[(0.0, 0.0), (20.0, 0.0), (20.0, 10.0), (10.0, 10.0), (10.0, 20.0), (0.0, 20.0)]);
        assert!(l_shape.contains_point(&Point2D::new(5.0, 15.0)));
        assert!(l_shape.contains_point(&Point2D::new(15.0, 5.0)));
        assert!(!l_shape.contains_point(&Point2D::new(15.0, 15.0)));
        // Ray passes exactly through the vertex (10, 10)
        assert!(l_shape.contains_point(&Point2D::new(5.0, 10.0)));
    }

    #[test]
    fn test_containment_matches_reference_ray_cast() {
        let shapes = vec![
            polygon(&[(0.0, 0.0), (40.0, 5.0), (35.0, 30.0), (5.0, 25.0)]),
            polygon(&[(10.0, 0.0), (30.0, 20.0), (50.0, 0.0), (45.0, 40.0), (30.0, 25.0), (15.0, 40.0)]),
            polygon(&[(0.0, 0.0), (60.0, 0.0), (60.0, 10.0), (10.0, 10.0), (10.0, 30.0), (60.0, 30.0), (60.0, 40.0), (0.0, 40.0)]),
        ];
        let mut rng = StdRng::seed_from_u64(42);

        for shape in &shapes {
            let mut checked = 0;
            while checked < 2000 {
                let p = Point2D::new(rng.gen_range(-5.0..65.0), rng.gen_range(-5.0..45.0));
                if shape.edges().iter().any(|e| distance_to_segment(&p, e) < 0.01) {
                    continue;
                }
                assert_eq!(shape.contains_point(&p), reference_contains(shape.vertices(), &p), "{:?}", p);
                checked += 1;
            }
        }
    }

    #[test]
    fn test_segment_intersection() {
        let square = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let through = Segment::new(Point2D::new(-5.0, 5.0), Point2D::new(15.0, 6.0));
        let outside = Segment::new(Point2D::new(-5.0, -5.0), Point2D::new(-1.0, 20.0));
        let inside = Segment::new(Point2D::new(2.0, 2.0), Point2D::new(8.0, 7.0));

        assert!(square.intersects(&through));
        assert!(!square.intersects(&outside));
        // Entirely interior segments never cross the boundary
        assert!(!square.intersects(&inside));
    }
}
