//! Utility modules for polygon_rrt

pub mod course_io;
pub mod visualization;

pub use course_io::*;
pub use visualization::{colors, PathStyle, PointStyle, TreeRecorder, Visualizer};
