//! Kinodynamic RRT for an oriented rectangular body
//!
//! Nodes carry a heading. A motion between two poses is accepted only if
//! the rectangular footprint, swept along the interpolated poses, never
//! crosses an obstacle edge. Positions are sampled like the holonomic
//! planner; headings are drawn uniformly and retried a few times per
//! position.

use std::f64::consts::{PI, TAU};

use itertools::Itertools;
use nalgebra::Vector2;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use tracing::{debug, info, trace};

use crate::collision::{ObstacleField, Segment};
use crate::common::{Configuration, DrawRole, PlanObserver, Point2D, Pose2D, RrtError, RrtResult, SamplingPlanner};
use crate::path_planning::rrt_common::{
    draw_solution, require_free, steer, PlanOutcome, RrtConfig, Sampler, SamplingRegion, SearchTree,
};

/// Samples closer than this to their nearest node are dropped
pub const MIN_EXTENSION: f64 = 0.5;
/// Random headings tried per sampled position
pub const HEADING_ATTEMPTS: usize = 10;
/// Translation between two checked poses of a sweep
pub const SWEEP_TRANSLATION_STEP: f64 = 5.0;
/// Rotation between two checked poses of a sweep, in degrees
pub const SWEEP_ROTATION_STEP_DEG: f64 = 10.0;
/// Upper bound on the interpolated poses of one sweep
pub const MAX_SWEEP_STEPS: usize = 100_000;

/// Rectangular body centred on the pose position.
///
/// At zero heading the rectangle spans `half_width` along x and
/// `half_length` along y.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    half_width: f64,
    half_length: f64,
    radius: f64,
    offsets: [f64; 4],
}

impl Default for Footprint {
    fn default() -> Self {
        Self::from_half_dims(10.0, 25.0)
    }
}

impl Footprint {
    pub fn new(half_width: f64, half_length: f64) -> RrtResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(half_width) && valid(half_length)) {
            return Err(RrtError::InvalidParameter(format!(
                "footprint half dimensions must be positive, got {} x {}",
                half_width, half_length
            )));
        }
        Ok(Self::from_half_dims(half_width, half_length))
    }

    fn from_half_dims(half_width: f64, half_length: f64) -> Self {
        let t = half_length.atan2(half_width);
        Footprint {
            half_width,
            half_length,
            radius: half_width.hypot(half_length),
            offsets: [t, PI - t, PI + t, TAU - t],
        }
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn half_length(&self) -> f64 {
        self.half_length
    }

    /// Corners of the footprint at `pose`, counter-clockwise
    pub fn corners(&self, pose: &Pose2D) -> [Point2D; 4] {
        let center = pose.position().to_vector();
        let corner = |offset: f64| {
            let angle = offset + pose.yaw;
            Point2D::from(center + Vector2::new(angle.cos(), angle.sin()) * self.radius)
        };
        [
            corner(self.offsets[0]),
            corner(self.offsets[1]),
            corner(self.offsets[2]),
            corner(self.offsets[3]),
        ]
    }

    /// True if any side of the footprint at `pose` crosses an obstacle edge
    pub fn collides_at(&self, field: &ObstacleField, pose: &Pose2D) -> bool {
        self.corners(pose)
            .iter()
            .circular_tuple_windows()
            .any(|(a, b)| field.collides(&Segment::new(*a, *b)))
    }

    /// Check the motion `from` → `to`.
    ///
    /// The final pose is tested first, then the interpolated poses spaced
    /// at most [`SWEEP_TRANSLATION_STEP`] apart and
    /// [`SWEEP_ROTATION_STEP_DEG`] in heading. Headings are interpolated
    /// without wrapping.
    pub fn sweep_collides(&self, field: &ObstacleField, from: &Pose2D, to: &Pose2D) -> bool {
        if self.collides_at(field, to) {
            return true;
        }

        let steps = Self::sweep_steps(from, to);
        let origin = from.to_vector();
        let delta = to.to_vector() - origin;
        (1..=steps).any(|i| {
            let s = i as f64 / steps as f64;
            self.collides_at(field, &Pose2D::from(origin + delta * s))
        })
    }

    /// Interpolated poses checked by [`Footprint::sweep_collides`], at
    /// most [`MAX_SWEEP_STEPS`]
    pub fn sweep_steps(from: &Pose2D, to: &Pose2D) -> usize {
        let translation = from.position().distance(&to.position());
        let rotation = (to.yaw - from.yaw).abs();
        if translation.is_nan() || rotation.is_nan() {
            return MAX_SWEEP_STEPS;
        }
        let by_translation = (translation / SWEEP_TRANSLATION_STEP).floor();
        let by_rotation = (rotation / SWEEP_ROTATION_STEP_DEG.to_radians()).floor();
        by_translation.max(by_rotation).min(MAX_SWEEP_STEPS as f64) as usize
    }
}

/// Kinodynamic RRT path planner
#[derive(Debug, Clone)]
pub struct KinodynamicRrtPlanner {
    field: ObstacleField,
    config: RrtConfig,
    footprint: Footprint,
}

impl KinodynamicRrtPlanner {
    pub fn new(field: ObstacleField, config: RrtConfig) -> RrtResult<Self> {
        Self::with_footprint(field, config, Footprint::default())
    }

    pub fn with_footprint(field: ObstacleField, config: RrtConfig, footprint: Footprint) -> RrtResult<Self> {
        config.validate()?;
        Ok(KinodynamicRrtPlanner {
            field,
            config,
            footprint,
        })
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    fn require_clear(&self, pose: &Pose2D, what: &str) -> RrtResult<()> {
        require_free(&self.field, &pose.position(), what)?;
        if !pose.yaw.is_finite() || pose.yaw.abs() > TAU {
            return Err(RrtError::InvalidInput(format!(
                "{} heading {} is outside [-2pi, 2pi]",
                what, pose.yaw
            )));
        }
        if self.footprint.collides_at(&self.field, pose) {
            return Err(RrtError::InvalidInput(format!(
                "{} footprint at ({}, {}, {:.3}) overlaps an obstacle",
                what, pose.x, pose.y, pose.yaw
            )));
        }
        Ok(())
    }

    fn draw_motion(&self, observer: &mut dyn PlanObserver, from: &Pose2D, to: &Pose2D) {
        observer.draw_line(from.position(), to.position(), DrawRole::TreeEdge(0));
        observer.draw_polygon(&self.footprint.corners(to), DrawRole::Footprint);
        observer.draw_circle(to.position(), self.config.node_marker_radius(), DrawRole::Node);
    }
}

impl SamplingPlanner for KinodynamicRrtPlanner {
    type Config = Pose2D;

    fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        start: Pose2D,
        goal: Pose2D,
        rng: &mut R,
        observer: &mut dyn PlanObserver,
    ) -> RrtResult<PlanOutcome<Pose2D>> {
        self.require_clear(&start, "start")?;
        self.require_clear(&goal, "goal")?;
        if start == goal {
            return Ok(PlanOutcome::Found {
                path: vec![start],
                nodes: 0,
            });
        }

        let region = SamplingRegion::around(&self.field, &[start.position(), goal.position()]);
        let sampler = Sampler::new(region, &self.config)?;
        let heading = Uniform::new(0.0, TAU);
        let step = self.config.step_size;

        let mut tree = SearchTree::new(start);
        let mut rejections = 0;

        for _ in 0..self.config.max_iter {
            if tree.expanded() >= self.config.max_nodes {
                break;
            }

            let sample = sampler.sample(&self.field, goal.position(), rng);
            observer.draw_circle(sample, 5.0, DrawRole::Sample);

            let (near, dist) = tree.nearest(&sample);
            if dist < MIN_EXTENSION {
                rejections += 1;
                continue;
            }
            let position = if dist > step {
                steer(&near.position(), &sample, step)
            } else if rejections < self.config.rejection_limit {
                rejections += 1;
                continue;
            } else {
                sample
            };
            if !self.field.is_valid(&position) {
                rejections += 1;
                continue;
            }

            let pose = (0..HEADING_ATTEMPTS)
                .map(|_| Pose2D::from_position(position, heading.sample(rng)))
                .find(|pose| !self.footprint.sweep_collides(&self.field, &near, pose));
            let pose = match pose {
                Some(pose) => pose,
                None => {
                    trace!("no clear heading at ({:.2}, {:.2})", position.x, position.y);
                    rejections += 1;
                    continue;
                }
            };

            tree.insert(&near, pose)?;
            rejections = 0;
            self.draw_motion(observer, &near, &pose);
            debug!("added ({:.2}, {:.2}, {:.3})", pose.x, pose.y, pose.yaw);

            if !self.footprint.sweep_collides(&self.field, &pose, &goal) {
                tree.insert(&pose, goal)?;
                self.draw_motion(observer, &pose, &goal);

                let path = tree.path_to(&goal)?;
                draw_solution(observer, &path, self.config.node_marker_radius());
                info!("Kinodynamic RRT: path found, {} poses, n = {}", path.len(), tree.expanded());
                return Ok(PlanOutcome::Found {
                    path,
                    nodes: tree.expanded(),
                });
            }
        }

        info!("Kinodynamic RRT: no path within budget, n = {}", tree.expanded());
        Ok(PlanOutcome::Exhausted {
            nodes: tree.expanded(),
        })
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }
}
