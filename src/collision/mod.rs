//! Polygonal obstacle collision model

pub mod segment;
pub mod obstacle;
pub mod obstacle_field;

pub use segment::*;
pub use obstacle::*;
pub use obstacle_field::*;
