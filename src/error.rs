//! Error types for the point visualizer

use thiserror::Error;

/// Point visualizer error types
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer size, shape, dimensionality or storage order does not match the
    /// expected contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A tuple element could not be interpreted as a number
    #[error("Type error: {0}")]
    TypeError(String),

    /// The rendering loop was interrupted from outside
    #[error("Rendering loop cancelled")]
    Cancelled,

    /// The rendering backend reported a failure
    #[error("Render backend error: {0}")]
    Backend(String),

    /// A render-thread operation was called from another thread
    #[error("{0} must be called from the thread that created the visualizer")]
    WrongThread(&'static str),

    /// File save error
    #[error("File save error: {0}")]
    FileSave(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for visualizer operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidArgument("Expected array of size: 12".to_string());
        assert_eq!(err.to_string(), "Invalid argument: Expected array of size: 12");

        let err = Error::WrongThread("run_once");
        assert_eq!(
            err.to_string(),
            "run_once must be called from the thread that created the visualizer"
        );
    }
}
