//! `tracing` subscriber initialization.
//!
//! Production output is one JSON object per event; the filter comes from
//! `RUST_LOG` and falls back to [`DEFAULT_DIRECTIVE`].

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Initialize JSON logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with(DEFAULT_DIRECTIVE);
}

/// Like [`init`], with a caller-chosen fallback filter.
pub fn init_with(default_directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default_directive))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_current_span(true)
        .with_target(false)
        .try_init();
}

/// Human-readable output captured by the test harness (`cargo test -- --nocapture`
/// to see it). Defaults to `debug` so rejection reasons show up.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("debug"))
        .with_test_writer()
        .try_init();
}

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}
