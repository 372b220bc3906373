//! Common types, traits, and error definitions for polygon_rrt
//!
//! This module provides the foundational building blocks shared by the
//! collision model and the planners.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
