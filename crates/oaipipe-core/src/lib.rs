//! oaipipe core - shared infrastructure for metadata harvesting pipelines
//!
//! Provides the HTTP client, logging, and progress reporting used by the
//! source-specific crates.

pub mod client;
pub mod logging;
pub mod progress;

// Re-exports for convenience
pub use client::{HttpError, SHARED_RUNTIME, http_client};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
