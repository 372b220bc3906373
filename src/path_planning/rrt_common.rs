//! Building blocks shared by the RRT variants: configuration, the sampling
//! region, steering, the per-tree search state and the plan outcome.

use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use tracing::{debug, trace};

use crate::collision::ObstacleField;
use crate::common::{Bounds2D, Configuration, DrawRole, Path2D, PlanObserver, Point2D, RrtError, RrtResult};
use crate::path_planning::kd_tree::KdTree;
use crate::path_planning::path_tree::PathTree;

/// Fraction of the obstacle-field span added around it for sampling
pub const REGION_MARGIN: f64 = 0.1;

/// Configuration for the RRT planners
#[derive(Debug, Clone)]
pub struct RrtConfig {
    /// Maximum distance between a node and its parent
    pub step_size: f64,
    /// Node budget, roots excluded
    pub max_nodes: usize,
    /// Probability of sampling the goal instead of a uniform point (0-1)
    pub goal_sample_rate: f64,
    /// Consecutive rejections before a sample closer than one step is taken as is
    pub rejection_limit: usize,
    /// Uniform draws per sample before giving up on finding free space
    pub max_sample_attempts: usize,
    /// Maximum loop iterations
    pub max_iter: usize,
    /// Random seed (None for entropy)
    pub seed: Option<u64>,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            step_size: 50.0,
            max_nodes: 2000,
            goal_sample_rate: 0.05,
            rejection_limit: 10,
            max_sample_attempts: 1000,
            max_iter: 1_000_000,
            seed: None,
        }
    }
}

impl RrtConfig {
    pub fn validate(&self) -> RrtResult<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(RrtError::InvalidParameter(format!(
                "step size must be positive, got {}",
                self.step_size
            )));
        }
        if self.max_nodes == 0 {
            return Err(RrtError::InvalidParameter("node budget must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.goal_sample_rate) {
            return Err(RrtError::InvalidParameter(format!(
                "goal sample rate must lie in [0, 1], got {}",
                self.goal_sample_rate
            )));
        }
        if self.max_sample_attempts == 0 {
            return Err(RrtError::InvalidParameter("sample attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Radius used when drawing tree nodes
    pub fn node_marker_radius(&self) -> f64 {
        (self.step_size / 5.0).min(5.0)
    }
}

/// Rectangle that uniform samples are drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRegion {
    offset: Point2D,
    span: Point2D,
}

impl SamplingRegion {
    /// `bounds` widened by [`REGION_MARGIN`] of its span, half on each side
    pub fn new(bounds: Bounds2D) -> Self {
        let (w, h) = (bounds.width(), bounds.height());
        SamplingRegion {
            offset: Point2D::new(bounds.xmin - w * REGION_MARGIN / 2.0, bounds.ymin - h * REGION_MARGIN / 2.0),
            span: Point2D::new(w * (1.0 + REGION_MARGIN), h * (1.0 + REGION_MARGIN)),
        }
    }

    /// Region around the obstacle field, stretched to cover the given points
    pub fn around(field: &ObstacleField, points: &[Point2D]) -> Self {
        let bounds = points
            .iter()
            .fold(field.bounds(), |acc, p| match acc {
                Some(b) => Some(b.including(p)),
                None => Some(Bounds2D::new(p.x, p.x, p.y, p.y)),
            })
            .unwrap_or_else(|| Bounds2D::new(0.0, 0.0, 0.0, 0.0));
        Self::new(bounds)
    }

    pub fn bounds(&self) -> Bounds2D {
        Bounds2D::new(
            self.offset.x,
            self.offset.x + self.span.x,
            self.offset.y,
            self.offset.y + self.span.y,
        )
    }

    /// Uniform point in the region
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        Point2D::new(
            self.offset.x + rng.gen::<f64>() * self.span.x,
            self.offset.y + rng.gen::<f64>() * self.span.y,
        )
    }

    /// Uniform point in free space, redrawn up to `attempts` times.
    ///
    /// Returns the last draw when no free point turned up; validation
    /// rejects it later.
    pub fn sample_free<R: Rng + ?Sized>(&self, field: &ObstacleField, attempts: usize, rng: &mut R) -> Point2D {
        let mut point = self.sample(rng);
        for _ in 1..attempts {
            if field.is_valid(&point) {
                break;
            }
            point = self.sample(rng);
        }
        point
    }
}

/// Goal-biased sampler over a [`SamplingRegion`]
#[derive(Debug, Clone)]
pub struct Sampler {
    region: SamplingRegion,
    goal_bias: Bernoulli,
    attempts: usize,
}

impl Sampler {
    pub fn new(region: SamplingRegion, config: &RrtConfig) -> RrtResult<Self> {
        let goal_bias = Bernoulli::new(config.goal_sample_rate)
            .map_err(|e| RrtError::InvalidParameter(format!("goal sample rate: {}", e)))?;
        Ok(Sampler {
            region,
            goal_bias,
            attempts: config.max_sample_attempts,
        })
    }

    pub fn region(&self) -> &SamplingRegion {
        &self.region
    }

    /// `target` with the goal-bias probability, otherwise a free uniform point
    pub fn sample<R: Rng + ?Sized>(&self, field: &ObstacleField, target: Point2D, rng: &mut R) -> Point2D {
        if self.goal_bias.sample(rng) {
            target
        } else {
            self.region.sample_free(field, self.attempts, rng)
        }
    }
}

/// Point exactly `step` from `near` towards `target`, or `target` itself
/// when it is no further than `step`.
pub fn steer(near: &Point2D, target: &Point2D, step: f64) -> Point2D {
    let dist = near.distance(target);
    if dist <= step {
        return *target;
    }
    Point2D::new(
        near.x + (target.x - near.x) * step / dist,
        near.y + (target.y - near.y) * step / dist,
    )
}

/// Result of a planner run
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome<C> {
    /// Path from start to goal, both included
    Found { path: Vec<C>, nodes: usize },
    /// Node budget (or iteration cap) ran out
    Exhausted { nodes: usize },
}

impl<C: Configuration> PlanOutcome<C> {
    pub fn is_found(&self) -> bool {
        matches!(self, PlanOutcome::Found { .. })
    }

    pub fn path(&self) -> Option<&[C]> {
        match self {
            PlanOutcome::Found { path, .. } => Some(path.as_slice()),
            PlanOutcome::Exhausted { .. } => None,
        }
    }

    pub fn into_path(self) -> Option<Vec<C>> {
        match self {
            PlanOutcome::Found { path, .. } => Some(path),
            PlanOutcome::Exhausted { .. } => None,
        }
    }

    /// Nodes inserted during the run, roots excluded
    pub fn nodes(&self) -> usize {
        match self {
            PlanOutcome::Found { nodes, .. } | PlanOutcome::Exhausted { nodes } => *nodes,
        }
    }

    /// Planar length of the path
    pub fn path_length(&self) -> Option<f64> {
        self.path().map(|p| Path2D::from_configurations(p).total_length())
    }
}

/// Spatial index and path tree grown together from one root
#[derive(Debug, Clone)]
pub struct SearchTree<C: Configuration> {
    index: KdTree<C>,
    paths: PathTree<C>,
}

impl<C: Configuration> SearchTree<C> {
    pub fn new(root: C) -> Self {
        SearchTree {
            index: KdTree::new(root),
            paths: PathTree::new(root),
        }
    }

    pub fn root(&self) -> C {
        self.paths.root()
    }

    pub fn nearest(&self, query: &Point2D) -> (C, f64) {
        self.index.nearest(query)
    }

    /// Record `child` under `parent` in both structures
    pub fn insert(&mut self, parent: &C, child: C) -> RrtResult<()> {
        self.paths.add_edge(parent, child)?;
        self.index.insert(child);
        Ok(())
    }

    pub fn path_to(&self, config: &C) -> RrtResult<Vec<C>> {
        self.paths.path_to(config)
    }

    /// Nodes inserted beyond the root
    pub fn expanded(&self) -> usize {
        self.index.len() - 1
    }

    pub fn path_tree(&self) -> &PathTree<C> {
        &self.paths
    }

    pub fn kd_tree(&self) -> &KdTree<C> {
        &self.index
    }
}

/// Result of one sample/steer/validate/insert step
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Extension {
    Added(Point2D),
    Rejected,
}

/// Everything one holonomic extension step reads
pub(crate) struct ExtendContext<'a> {
    pub field: &'a ObstacleField,
    pub sampler: &'a Sampler,
    pub config: &'a RrtConfig,
}

impl<'a> ExtendContext<'a> {
    /// Grow `tree` towards a random sample biased to `bias_target`.
    ///
    /// `rejections` counts consecutive failures and is reset on success.
    pub fn extend<R: Rng + ?Sized>(
        &self,
        tree: &mut SearchTree<Point2D>,
        tree_id: usize,
        bias_target: Point2D,
        rejections: &mut usize,
        rng: &mut R,
        observer: &mut dyn PlanObserver,
    ) -> RrtResult<Extension> {
        let step = self.config.step_size;
        let sample = self.sampler.sample(self.field, bias_target, rng);
        observer.draw_circle(sample, 5.0, DrawRole::Sample);

        let (near, dist) = tree.nearest(&sample);
        let candidate = if dist > step {
            steer(&near, &sample, step)
        } else if *rejections < self.config.rejection_limit {
            // Too close to an existing node; only take it after repeated failures
            *rejections += 1;
            return Ok(Extension::Rejected);
        } else {
            sample
        };

        if !self.field.is_valid(&candidate) || self.field.collides_between(&near, &candidate) {
            trace!("rejected candidate ({:.2}, {:.2})", candidate.x, candidate.y);
            *rejections += 1;
            return Ok(Extension::Rejected);
        }

        tree.insert(&near, candidate)?;
        *rejections = 0;
        debug!("tree {}: added ({:.2}, {:.2})", tree_id, candidate.x, candidate.y);
        observer.draw_line(near, candidate, DrawRole::TreeEdge(tree_id));
        observer.draw_circle(candidate, self.config.node_marker_radius(), DrawRole::Node);
        Ok(Extension::Added(candidate))
    }
}

/// Fail with `InvalidInput` when `point` is not in free space
pub(crate) fn require_free(field: &ObstacleField, point: &Point2D, what: &str) -> RrtResult<()> {
    if !point.is_finite() {
        return Err(RrtError::InvalidInput(format!("{} ({}, {}) is not finite", what, point.x, point.y)));
    }
    if let Some(index) = field.obstacle_containing(point) {
        return Err(RrtError::InvalidInput(format!(
            "{} ({}, {}) lies inside obstacle {}",
            what, point.x, point.y, index
        )));
    }
    Ok(())
}

/// Draw the final path
pub(crate) fn draw_solution<C: Configuration>(observer: &mut dyn PlanObserver, path: &[C], radius: f64) {
    for pair in path.windows(2) {
        observer.draw_line(pair[0].position(), pair[1].position(), DrawRole::Solution);
    }
    for config in path {
        observer.draw_circle(config.position(), radius * 1.5, DrawRole::Solution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rrt_config_default() {
        let config = RrtConfig::default();
        assert_eq!(config.step_size, 50.0);
        assert_eq!(config.max_nodes, 2000);
        assert_eq!(config.goal_sample_rate, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rrt_config_validation() {
        let bad_step = RrtConfig { step_size: 0.0, ..Default::default() };
        assert!(matches!(bad_step.validate(), Err(RrtError::InvalidParameter(_))));

        let bad_rate = RrtConfig { goal_sample_rate: 1.5, ..Default::default() };
        assert!(bad_rate.validate().is_err());

        let bad_budget = RrtConfig { max_nodes: 0, ..Default::default() };
        assert!(bad_budget.validate().is_err());
    }

    #[test]
    fn test_steer() {
        let near = Point2D::new(0.0, 0.0);
        let far = Point2D::new(30.0, 40.0);
        let next = steer(&near, &far, 10.0);
        assert_relative_eq!(next.x, 6.0, epsilon = 1e-12);
        assert_relative_eq!(next.y, 8.0, epsilon = 1e-12);
        assert_relative_eq!(near.distance(&next), 10.0, epsilon = 1e-12);

        let close = Point2D::new(3.0, 4.0);
        assert_eq!(steer(&near, &close, 10.0), close);
    }

    #[test]
    fn test_sampling_region_margin() {
        let region = SamplingRegion::new(Bounds2D::new(0.0, 100.0, 0.0, 200.0));
        let bounds = region.bounds();
        assert_relative_eq!(bounds.xmin, -5.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.xmax, 105.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.ymin, -10.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.ymax, 210.0, epsilon = 1e-9);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(bounds.contains(&region.sample(&mut rng)));
        }
    }

    #[test]
    fn test_region_covers_start_and_goal() {
        let region = SamplingRegion::around(
            &ObstacleField::empty(),
            &[Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0)],
        );
        let bounds = region.bounds();
        assert_relative_eq!(bounds.xmin, -5.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.xmax, 105.0, epsilon = 1e-9);
        assert_eq!(bounds.height(), 0.0);
    }

    #[test]
    fn test_free_sampling_avoids_obstacles() {
        let field = ObstacleField::from_rings(vec![vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(100.0, 50.0),
            Point2D::new(0.0, 50.0),
        ]])
        .unwrap();
        let region = SamplingRegion::around(&field, &[]);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let p = region.sample_free(&field, 1000, &mut rng);
            assert!(field.is_valid(&p));
        }
    }

    #[test]
    fn test_search_tree_counts_expansions() {
        let root = Point2D::new(0.0, 0.0);
        let mut tree = SearchTree::new(root);
        assert_eq!(tree.expanded(), 0);

        let child = Point2D::new(1.0, 1.0);
        tree.insert(&root, child).unwrap();
        assert_eq!(tree.expanded(), 1);
        assert_eq!(tree.nearest(&Point2D::new(2.0, 2.0)).0, child);
        assert_eq!(tree.path_to(&child).unwrap(), vec![root, child]);
        assert!(tree.insert(&Point2D::new(9.0, 9.0), Point2D::new(10.0, 10.0)).is_err());
    }

    #[test]
    fn test_outcome_helpers() {
        let found = PlanOutcome::Found {
            path: vec![Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0)],
            nodes: 1,
        };
        assert!(found.is_found());
        assert_relative_eq!(found.path_length().unwrap(), 5.0);

        let exhausted: PlanOutcome<Point2D> = PlanOutcome::Exhausted { nodes: 50 };
        assert!(!exhausted.is_found());
        assert_eq!(exhausted.nodes(), 50);
        assert!(exhausted.into_path().is_none());
    }
}
