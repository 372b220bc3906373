//! 2D KD-tree for incremental nearest-neighbour queries
//!
//! Nodes live in an arena and refer to their children by index. The split
//! axis alternates x/y with depth starting with x at the root, and the
//! tree is never rebalanced: its shape depends on insertion order, which
//! is random for the planners.

use crate::common::{Configuration, Point2D};

#[derive(Debug, Clone)]
struct KdNode<C> {
    config: C,
    left: Option<usize>,
    right: Option<usize>,
}

/// Unbalanced 2D KD-tree over configurations
#[derive(Debug, Clone)]
pub struct KdTree<C: Configuration> {
    nodes: Vec<KdNode<C>>,
}

impl<C: Configuration> KdTree<C> {
    /// Create a tree holding a single seed configuration
    pub fn new(seed: C) -> Self {
        KdTree {
            nodes: vec![KdNode {
                config: seed,
                left: None,
                right: None,
            }],
        }
    }

    /// Number of stored configurations, seed included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the tree is created with its seed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stored configurations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &C> + '_ {
        self.nodes.iter().map(|n| &n.config)
    }

    /// Insert a configuration as a new leaf
    pub fn insert(&mut self, config: C) {
        let position = config.position();
        let new_index = self.nodes.len();
        let mut current = 0;
        let mut axis = 0;

        loop {
            let node = &mut self.nodes[current];
            let slot = if position.coord(axis) < node.config.position().coord(axis) {
                &mut node.left
            } else {
                &mut node.right
            };

            match *slot {
                Some(next) => current = next,
                None => {
                    *slot = Some(new_index);
                    break;
                }
            }
            axis = 1 - axis;
        }

        self.nodes.push(KdNode {
            config,
            left: None,
            right: None,
        });
    }

    /// Closest stored configuration to `query` and its Euclidean distance.
    ///
    /// Ties keep the configuration found first.
    pub fn nearest(&self, query: &Point2D) -> (C, f64) {
        let mut best = (0, f64::INFINITY);
        self.search(query, 0, 0, &mut best);
        (self.nodes[best.0].config, best.1)
    }

    fn search(&self, query: &Point2D, index: usize, axis: usize, best: &mut (usize, f64)) {
        let node = &self.nodes[index];
        let position = node.config.position();

        let dist = query.distance(&position);
        if dist < best.1 {
            *best = (index, dist);
        }

        let offset = query.coord(axis) - position.coord(axis);
        let (near, far) = if offset < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.search(query, near, 1 - axis, best);
        }
        if let Some(far) = far {
            // The far side can only help if the splitting line is closer than the best so far
            if offset.abs() < best.1 {
                self.search(query, far, 1 - axis, best);
            }
        }
    }

    /// Height of the tree, 1 for a lone seed
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[index];
            stack.extend(node.left.iter().chain(node.right.iter()).map(|&c| (c, depth + 1)));
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pose2D;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(points: &[Point2D], query: &Point2D) -> f64 {
        points.iter().map(|p| p.distance(query)).fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_single_seed() {
        let tree = KdTree::new(Point2D::new(3.0, 4.0));
        let (nearest, dist) = tree.nearest(&Point2D::origin());
        assert_eq!(nearest, Point2D::new(3.0, 4.0));
        assert!((dist - 5.0).abs() < 1e-12);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_split_axis_alternates() {
        let mut tree = KdTree::new(Point2D::new(50.0, 50.0));
        // Left of the root on x, then above it on y
        tree.insert(Point2D::new(10.0, 50.0));
        tree.insert(Point2D::new(20.0, 80.0));
        tree.insert(Point2D::new(20.0, 10.0));
        assert_eq!(tree.depth(), 3);

        let (nearest, _) = tree.nearest(&Point2D::new(21.0, 79.0));
        assert_eq!(nearest, Point2D::new(20.0, 80.0));
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..20 {
            let mut points = vec![Point2D::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0))];
            let mut tree = KdTree::new(points[0]);
            for _ in 0..300 {
                let p = if rng.gen_bool(0.1) {
                    // Integer grid points produce ties on the split coordinates
                    Point2D::new(rng.gen_range(0..10) as f64 * 10.0, rng.gen_range(0..10) as f64 * 10.0)
                } else {
                    Point2D::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0))
                };
                tree.insert(p);
                points.push(p);
            }

            for _ in 0..200 {
                let q = Point2D::new(rng.gen_range(-10.0..110.0), rng.gen_range(-10.0..110.0));
                let (nearest, dist) = tree.nearest(&q);
                assert_eq!(dist, brute_force(&points, &q));
                assert_eq!(nearest.distance(&q), dist);
            }

            for p in points.iter().step_by(17) {
                let (nearest, dist) = tree.nearest(p);
                assert_eq!(dist, 0.0);
                assert_eq!(nearest, *p);
            }
        }
    }

    #[test]
    fn test_first_minimum_wins_ties() {
        let mut tree = KdTree::new(Point2D::new(0.0, 0.0));
        tree.insert(Point2D::new(2.0, 0.0));
        let (nearest, dist) = tree.nearest(&Point2D::new(1.0, 0.0));
        assert_eq!(nearest, Point2D::new(0.0, 0.0));
        assert_eq!(dist, 1.0);
    }

    #[test]
    fn test_pose_payload_is_preserved() {
        let mut tree = KdTree::new(Pose2D::new(0.0, 0.0, 0.0));
        tree.insert(Pose2D::new(10.0, 0.0, 1.25));
        let (nearest, _) = tree.nearest(&Point2D::new(9.0, 1.0));
        assert_eq!(nearest.yaw, 1.25);
        assert_eq!(tree.iter().count(), 2);
    }
}
