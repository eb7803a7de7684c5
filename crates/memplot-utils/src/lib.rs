//! # memplot Utilities
//!
//! Logging setup shared by the `memplot` binary and by debugger hosts that
//! embed `memplot-core`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    default_log_file, init_logging, init_logging_to_file, init_logging_with, init_logging_with_level, LogFormat,
    LogGuard, LogLevel, LoggingError,
};
pub use tracing::{debug, error, info, trace, warn};
