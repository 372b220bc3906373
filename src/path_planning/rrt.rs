//! RRT (Rapidly-exploring Random Tree) path planning algorithm
//!
//! Single-tree, goal-biased variant for a point agent among polygonal
//! obstacles. After every accepted node the planner tries a straight,
//! collision-checked connection to the goal and, when it is clear, walks
//! there in step-size increments.

use rand::Rng;
use tracing::{debug, info};

use crate::collision::ObstacleField;
use crate::common::{DrawRole, PlanObserver, Point2D, RrtResult, SamplingPlanner};
use crate::path_planning::rrt_common::{
    draw_solution, require_free, steer, ExtendContext, Extension, PlanOutcome, RrtConfig, Sampler, SamplingRegion,
    SearchTree,
};

/// RRT path planner
#[derive(Debug, Clone)]
pub struct RrtPlanner {
    field: ObstacleField,
    config: RrtConfig,
}

impl RrtPlanner {
    /// Create a new RRT planner
    pub fn new(field: ObstacleField, config: RrtConfig) -> RrtResult<Self> {
        config.validate()?;
        Ok(RrtPlanner { field, config })
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    /// Walk from `from` to `goal` in step-size increments, the last one
    /// landing exactly on `goal`
    fn walk_to_goal(
        &self,
        tree: &mut SearchTree<Point2D>,
        from: Point2D,
        goal: Point2D,
        observer: &mut dyn PlanObserver,
    ) -> RrtResult<()> {
        let mut current = from;
        while current != goal {
            let next = steer(&current, &goal, self.config.step_size);
            tree.insert(&current, next)?;
            observer.draw_line(current, next, DrawRole::TreeEdge(0));
            observer.draw_circle(next, self.config.node_marker_radius(), DrawRole::Node);
            current = next;
        }
        Ok(())
    }
}

impl SamplingPlanner for RrtPlanner {
    type Config = Point2D;

    fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        start: Point2D,
        goal: Point2D,
        rng: &mut R,
        observer: &mut dyn PlanObserver,
    ) -> RrtResult<PlanOutcome<Point2D>> {
        require_free(&self.field, &start, "start")?;
        require_free(&self.field, &goal, "goal")?;
        if start == goal {
            return Ok(PlanOutcome::Found {
                path: vec![start],
                nodes: 0,
            });
        }

        let sampler = Sampler::new(SamplingRegion::around(&self.field, &[start, goal]), &self.config)?;
        let context = ExtendContext {
            field: &self.field,
            sampler: &sampler,
            config: &self.config,
        };
        let mut tree = SearchTree::new(start);
        let mut rejections = 0;

        for _ in 0..self.config.max_iter {
            if tree.expanded() >= self.config.max_nodes {
                break;
            }

            let node = match context.extend(&mut tree, 0, goal, &mut rejections, rng, observer)? {
                Extension::Added(node) => node,
                Extension::Rejected => continue,
            };

            if !self.field.collides_between(&node, &goal) {
                debug!("clear line from ({:.2}, {:.2}) to goal", node.x, node.y);
                self.walk_to_goal(&mut tree, node, goal, observer)?;

                let path = tree.path_to(&goal)?;
                draw_solution(observer, &path, self.config.node_marker_radius());
                info!("RRT: path found, {} waypoints, n = {}", path.len(), tree.expanded());
                return Ok(PlanOutcome::Found {
                    path,
                    nodes: tree.expanded(),
                });
            }
        }

        info!("RRT: no path within budget, n = {}", tree.expanded());
        Ok(PlanOutcome::Exhausted {
            nodes: tree.expanded(),
        })
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::{NoopObserver, RrtError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ]
    }

    /// Wall between x = 40 and x = 60 with a wide corridor above it
    pub(crate) fn wall_field() -> ObstacleField {
        ObstacleField::from_rings(vec![rect(40.0, -20.0, 60.0, 60.0), rect(40.0, 90.0, 60.0, 100.0)]).unwrap()
    }

    /// Thick square frame with a 1-unit slit through its right side
    pub(crate) fn slit_frame() -> ObstacleField {
        let ring = [
            (200.0, 101.0),
            (200.0, 200.0),
            (0.0, 200.0),
            (0.0, 0.0),
            (200.0, 0.0),
            (200.0, 100.0),
            (150.0, 100.0),
            (150.0, 50.0),
            (50.0, 50.0),
            (50.0, 150.0),
            (150.0, 150.0),
            (150.0, 101.0),
        ];
        ObstacleField::from_rings(vec![ring.iter().map(|&p| Point2D::from(p)).collect()]).unwrap()
    }

    pub(crate) fn assert_valid_edges(field: &ObstacleField, path: &[Point2D], step: f64) {
        for pair in path.windows(2) {
            assert!(pair[0].distance(&pair[1]) <= step + 1e-9, "edge too long: {:?}", pair);
            assert!(!field.collides_between(&pair[0], &pair[1]), "edge collides: {:?}", pair);
            assert!(field.is_valid(&pair[1]));
        }
    }

    #[test]
    fn test_open_ground_reaches_goal_exactly() {
        let config = RrtConfig { step_size: 10.0, max_nodes: 500, ..Default::default() };
        let planner = RrtPlanner::new(ObstacleField::empty(), config).unwrap();
        let start = Point2D::new(0.0, 0.0);
        let goal = Point2D::new(100.0, 0.0);

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = planner.plan_with_rng(start, goal, &mut rng, &mut NoopObserver).unwrap();
            let path = outcome.path().expect("open ground must be solved");

            assert_eq!(path[0], start);
            assert_eq!(*path.last().unwrap(), goal);
            let length = outcome.path_length().unwrap();
            assert!((length - 100.0).abs() <= 10.0, "length {}", length);
            assert_valid_edges(planner.field(), path, 10.0);
        }
    }

    #[test]
    fn test_finds_path_around_wall() {
        let config = RrtConfig { step_size: 10.0, max_nodes: 2000, ..Default::default() };
        let planner = RrtPlanner::new(wall_field(), config).unwrap();
        let start = Point2D::new(10.0, 10.0);
        let goal = Point2D::new(90.0, 10.0);

        let mut rng = StdRng::seed_from_u64(5);
        let outcome = planner.plan_with_rng(start, goal, &mut rng, &mut NoopObserver).unwrap();
        let path = outcome.path().expect("corridor above the wall is wide open");

        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
        assert_valid_edges(planner.field(), path, 10.0);
        assert!(path.iter().any(|p| p.y > 60.0 || p.y < -20.0));
    }

    /// Samples drawn before the first accepted node
    #[derive(Default)]
    struct SampleLog {
        samples: usize,
        first_node_at: Option<usize>,
    }

    impl PlanObserver for SampleLog {
        fn draw_circle(&mut self, _center: Point2D, _radius: f64, role: DrawRole) {
            match role {
                DrawRole::Sample => self.samples += 1,
                DrawRole::Node if self.first_node_at.is_none() => self.first_node_at = Some(self.samples),
                _ => {}
            }
        }
    }

    #[test]
    fn test_close_sample_taken_after_rejection_limit() {
        let start = Point2D::new(0.0, 0.0);
        let goal = Point2D::new(5.0, 0.0);

        for &limit in &[10, 3] {
            let config = RrtConfig {
                step_size: 10.0,
                goal_sample_rate: 1.0,
                rejection_limit: limit,
                ..Default::default()
            };
            let planner = RrtPlanner::new(ObstacleField::empty(), config).unwrap();

            let mut rng = StdRng::seed_from_u64(0);
            let mut log = SampleLog::default();
            let outcome = planner.plan_with_rng(start, goal, &mut rng, &mut log).unwrap();

            // The goal lies within one step, so it is skipped `limit` times
            assert_eq!(log.first_node_at, Some(limit + 1));
            assert_eq!(log.samples, limit + 1);
            assert_eq!(outcome, PlanOutcome::Found { path: vec![start, goal], nodes: 1 });
        }
    }

    #[test]
    fn test_narrow_slit_exhausts_budget() {
        let config = RrtConfig { step_size: 10.0, max_nodes: 50, ..Default::default() };
        let planner = RrtPlanner::new(slit_frame(), config).unwrap();
        let start = Point2D::new(100.0, 80.0);
        let goal = Point2D::new(-5.0, 100.0);

        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = planner.plan_with_rng(start, goal, &mut rng, &mut NoopObserver).unwrap();
            assert_eq!(outcome, PlanOutcome::Exhausted { nodes: 50 });
        }
    }

    #[test]
    fn test_start_inside_obstacle_is_input_error() {
        let planner = RrtPlanner::new(slit_frame(), RrtConfig::default()).unwrap();
        let result = planner.plan(Point2D::new(25.0, 25.0), Point2D::new(100.0, 80.0));
        assert!(matches!(result, Err(RrtError::InvalidInput(_))));

        let result = planner.plan(Point2D::new(100.0, 80.0), Point2D::new(25.0, 25.0));
        assert!(matches!(result, Err(RrtError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RrtConfig { step_size: -1.0, ..Default::default() };
        assert!(matches!(
            RrtPlanner::new(ObstacleField::empty(), config),
            Err(RrtError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = RrtConfig { step_size: 10.0, seed: Some(99), ..Default::default() };
        let planner = RrtPlanner::new(wall_field(), config).unwrap();
        let start = Point2D::new(10.0, 10.0);
        let goal = Point2D::new(90.0, 10.0);

        assert_eq!(planner.plan(start, goal).unwrap(), planner.plan(start, goal).unwrap());

        let mut log = SampleLog::default();
        let observed = planner.plan_observed(start, goal, &mut log).unwrap();
        assert_eq!(observed, planner.plan(start, goal).unwrap());
        assert!(log.samples > 0);
        assert!(log.first_node_at.is_some());
    }
}
