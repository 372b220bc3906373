//! Common traits defining interfaces for the planners

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::error::RrtResult;
use crate::common::types::*;
use crate::path_planning::rrt_common::PlanOutcome;

/// What a drawing call depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawRole {
    /// Random sample under consideration
    Sample,
    /// Accepted edge of tree `0` (start side) or `1` (goal side)
    TreeEdge(usize),
    /// Accepted node
    Node,
    /// Rigid-body footprint at a pose
    Footprint,
    /// Edge or node of the final path
    Solution,
}

/// Receives drawing calls while a planner runs.
///
/// Purely for observation: implementations must not influence planning,
/// and every method defaults to doing nothing.
pub trait PlanObserver {
    /// Polyline between two positions
    fn draw_line(&mut self, _from: Point2D, _to: Point2D, _role: DrawRole) {}

    /// Circle at a position
    fn draw_circle(&mut self, _center: Point2D, _radius: f64, _role: DrawRole) {}

    /// Closed polygon
    fn draw_polygon(&mut self, _vertices: &[Point2D], _role: DrawRole) {}
}

/// Observer that ignores every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PlanObserver for NoopObserver {}

/// Trait for sampling-based planners (RRT variants)
pub trait SamplingPlanner {
    /// Configuration type planned over
    type Config: Configuration;

    /// Plan from `start` to `goal`, drawing randomness from `rng`
    fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        start: Self::Config,
        goal: Self::Config,
        rng: &mut R,
        observer: &mut dyn PlanObserver,
    ) -> RrtResult<PlanOutcome<Self::Config>>;

    /// Seed used by [`SamplingPlanner::plan`], `None` for entropy
    fn seed(&self) -> Option<u64>;

    /// Plan with a generator built from the configured seed, reporting to
    /// `observer`
    fn plan_observed(
        &self,
        start: Self::Config,
        goal: Self::Config,
        observer: &mut dyn PlanObserver,
    ) -> RrtResult<PlanOutcome<Self::Config>> {
        let mut rng = match self.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.plan_with_rng(start, goal, &mut rng, observer)
    }

    /// Plan with a generator built from the configured seed
    fn plan(&self, start: Self::Config, goal: Self::Config) -> RrtResult<PlanOutcome<Self::Config>> {
        self.plan_observed(start, goal, &mut NoopObserver)
    }
}
