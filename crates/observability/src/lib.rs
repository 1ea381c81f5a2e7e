//! Process-wide logging setup shared by the binary and the test harnesses.

/// Subscriber configuration (filters, formatting).
pub mod tracing;

pub use self::tracing::{DEFAULT_DIRECTIVE, init, init_for_tests, init_with};
