//! Resilient multi-mirror resolution: pick a stream proxy, choose an audio
//! rendition, resolve a validated download link, and fail over between
//! interchangeable service mirrors.

pub mod resolver;

pub use resolver::*;

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
