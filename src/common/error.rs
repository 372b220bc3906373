//! Error types for polygon_rrt

use thiserror::Error;

/// Main error type for planning
///
/// Running out of node budget is not an error; planners report it as
/// `PlanOutcome::Exhausted`.
#[derive(Debug, Error)]
pub enum RrtError {
    /// Invalid planner parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Malformed geometry, or start/goal not in free space
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Path tree used with a configuration it never recorded
    #[error("Tree structure error: {0}")]
    TreeStructure(String),
    /// Malformed obstacle course or start/goal text
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for planning operations
pub type RrtResult<T> = Result<T, RrtError>;
