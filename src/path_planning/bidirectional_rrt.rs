//! Bidirectional RRT
//!
//! Grows one tree from the start and one from the goal, alternating every
//! iteration. Whenever the previous node came from the other tree, the
//! active tree first steers towards it; the search ends when one tree
//! reaches a node of the other exactly.

use rand::Rng;
use tracing::{debug, info};

use crate::collision::ObstacleField;
use crate::common::{DrawRole, PlanObserver, Point2D, RrtResult, SamplingPlanner};
use crate::path_planning::rrt_common::{
    draw_solution, require_free, steer, ExtendContext, Extension, PlanOutcome, RrtConfig, Sampler, SamplingRegion,
    SearchTree,
};

/// Index of the tree rooted at the start
const START_TREE: usize = 0;
/// Index of the tree rooted at the goal
const GOAL_TREE: usize = 1;

/// Bidirectional RRT path planner
#[derive(Debug, Clone)]
pub struct BidirectionalRrtPlanner {
    field: ObstacleField,
    config: RrtConfig,
}

impl BidirectionalRrtPlanner {
    pub fn new(field: ObstacleField, config: RrtConfig) -> RrtResult<Self> {
        config.validate()?;
        Ok(BidirectionalRrtPlanner { field, config })
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    /// Steer `tree` one step towards `target`, a node of the other tree.
    ///
    /// Returns the inserted node, or `None` when the motion is blocked.
    fn connect(
        &self,
        tree: &mut SearchTree<Point2D>,
        tree_id: usize,
        target: Point2D,
        observer: &mut dyn PlanObserver,
    ) -> RrtResult<Option<Point2D>> {
        let (near, _) = tree.nearest(&target);
        let candidate = steer(&near, &target, self.config.step_size);

        if !self.field.is_valid(&candidate) || self.field.collides_between(&near, &candidate) {
            return Ok(None);
        }

        tree.insert(&near, candidate)?;
        observer.draw_line(near, candidate, DrawRole::TreeEdge(tree_id));
        observer.draw_circle(candidate, self.config.node_marker_radius(), DrawRole::Node);
        Ok(Some(candidate))
    }

    /// Start-tree path to `meeting` followed by the goal-tree path back to
    /// the goal, `meeting` appearing once
    fn join(trees: &[SearchTree<Point2D>; 2], meeting: &Point2D) -> RrtResult<Vec<Point2D>> {
        let mut path = trees[START_TREE].path_to(meeting)?;
        let goal_side = trees[GOAL_TREE].path_to(meeting)?;
        path.extend(goal_side.into_iter().rev().skip(1));
        Ok(path)
    }
}

impl SamplingPlanner for BidirectionalRrtPlanner {
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
        let roots = [start, goal];
        let mut trees = [SearchTree::new(start), SearchTree::new(goal)];
        let expanded = |trees: &[SearchTree<Point2D>; 2]| trees[0].expanded() + trees[1].expanded();

        let mut active = GOAL_TREE;
        let mut last: Option<(Point2D, usize)> = None;
        let mut rejections = 0;

        for _ in 0..self.config.max_iter {
            if expanded(&trees) >= self.config.max_nodes {
                break;
            }
            active = 1 - active;

            if let Some((target, owner)) = last {
                if owner != active {
                    if let Some(node) = self.connect(&mut trees[active], active, target, observer)? {
                        if node == target {
                            debug!("trees met at ({:.2}, {:.2})", node.x, node.y);
                            let path = Self::join(&trees, &node)?;
                            draw_solution(observer, &path, self.config.node_marker_radius());

                            let nodes = expanded(&trees);
                            info!(
                                "Bidirectional RRT: path found, {} waypoints, n = {} ({}, {})",
                                path.len(),
                                nodes,
                                trees[START_TREE].expanded(),
                                trees[GOAL_TREE].expanded()
                            );
                            return Ok(PlanOutcome::Found { path, nodes });
                        }
                        last = Some((node, active));
                        rejections = 0;
                        continue;
                    }
                }
            }

            let bias_target = roots[1 - active];
            if let Extension::Added(node) =
                context.extend(&mut trees[active], active, bias_target, &mut rejections, rng, observer)?
            {
                last = Some((node, active));
            }
        }

        info!(
            "Bidirectional RRT: no path within budget, n = {} ({}, {})",
            expanded(&trees),
            trees[START_TREE].expanded(),
            trees[GOAL_TREE].expanded()
        );
        Ok(PlanOutcome::Exhausted {
            nodes: expanded(&trees),
        })
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }
}
