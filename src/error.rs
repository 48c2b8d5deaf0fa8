//! Error types for the warp primitive layer
//!
//! The primitive operations themselves have no failure channel: a violated
//! precondition (reading from a lane outside the declared mask, an
//! out-of-range lane index) is a caller bug and is caught by assertions, not
//! reported. The `Result` channel covers cohort construction and launch,
//! where real failures exist (a lane thread panicking, an invalid group
//! shape).

use thiserror::Error;

/// Errors produced by cohort construction and launch.
#[derive(Debug, Error)]
pub enum WarpError {
    /// General runtime error (launch failures, invalid group shapes)
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// A lane thread panicked during a launch
    #[error("Lane failure: {0}")]
    LaneFailure(String),
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, WarpError>;

/// Construct a [`WarpError::RuntimeError`] from format arguments.
#[macro_export]
macro_rules! runtime_error {
    ($($arg:tt)*) => {
        $crate::error::WarpError::RuntimeError(format!($($arg)*))
    };
}
