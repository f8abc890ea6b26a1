//! Error handling for the PFor codec

use thiserror::Error;

/// Main error type for codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid bit width: {0} (must be 0-32)")]
    InvalidBitWidth(u32),

    #[error("Buffer too small: {required} words required, {available} available")]
    BufferTooSmall { required: usize, available: usize },

    #[error("Corrupt header: {0}")]
    CorruptHeader(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CodecError {
    /// Returns whether this error was caused by malformed compressed input
    /// rather than by the caller's arguments
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            CodecError::CorruptHeader(_) | CodecError::CorruptData(_)
        )
    }
}

/// Result type alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Macro for creating corrupt header errors
#[macro_export]
macro_rules! corrupt_header {
    ($msg:expr) => {
        $crate::common::error::CodecError::CorruptHeader($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::CodecError::CorruptHeader(format!($fmt, $($arg)*))
    };
}

/// Macro for creating corrupt data errors
#[macro_export]
macro_rules! corrupt_data {
    ($msg:expr) => {
        $crate::common::error::CodecError::CorruptData($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::CodecError::CorruptData(format!($fmt, $($arg)*))
    };
}

/// Fails with `BufferTooSmall` unless `available >= required`
pub fn ensure_capacity(required: usize, available: usize) -> CodecResult<()> {
    if available < required {
        return Err(CodecError::BufferTooSmall {
            required,
            available,
        });
    }
    Ok(())
}
