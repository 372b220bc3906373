// Path Planning algorithms module

pub mod kd_tree;
pub mod path_tree;
pub mod rrt_common;
pub mod rrt;
pub mod bidirectional_rrt;
pub mod kinodynamic_rrt;

pub use kd_tree::*;
pub use path_tree::*;
pub use rrt_common::*;
pub use rrt::*;
pub use bidirectional_rrt::*;
pub use kinodynamic_rrt::*;
