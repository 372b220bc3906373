//! polygon_rrt - Rapidly-exploring random tree planners among polygonal obstacles
//!
//! This crate provides a polygon collision model (segments, obstacles and
//! obstacle fields), an incremental KD-tree and a parent-linked path tree,
//! and three RRT variants built on them: single-tree, bidirectional and
//! kinodynamic with a rectangular footprint.

// Core modules
pub mod common;
pub mod collision;
pub mod utils;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Bounds2D, Configuration, Path2D, Point2D, Pose2D};
pub use common::{DrawRole, NoopObserver, PlanObserver, SamplingPlanner};
pub use common::{RrtError, RrtResult};
pub use collision::{Obstacle, ObstacleField, Segment};
pub use path_planning::{BidirectionalRrtPlanner, KinodynamicRrtPlanner, PlanOutcome, RrtConfig, RrtPlanner};
