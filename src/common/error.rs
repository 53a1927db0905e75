//! Error handling for sift

use thiserror::Error;

/// Main error type for sift operations
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for sift operations (alias for Result)
pub type SiftResult<T> = std::result::Result<T, SiftError>;

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_err {
    ($msg:expr) => {
        $crate::common::error::SiftError::Internal($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::SiftError::Internal(format!($fmt, $($arg)*))
    };
}
