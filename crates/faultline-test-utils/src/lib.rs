//! Shared fixtures for the faultline test suites.

pub mod fixtures;
pub mod sink;

pub use fixtures::RawError;
pub use sink::{CapturingSink, capturing_context};

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;

/// Install a stderr subscriber for the current scope only. Keep the guard
/// alive for as long as output is wanted.
pub fn init_test_tracing(
    level: impl Into<LevelFilter> + Copy,
) -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::filter::Targets::new()
        .with_target("faultline", level)
        .with_target("faultline_error", level)
        .with_target("faultline_chainvalidator", level);

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_level(true)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .set_default()
}

/// [`init_test_tracing`] at `DEBUG`.
pub fn init_debug_tracing() -> tracing::subscriber::DefaultGuard {
    init_test_tracing(Level::DEBUG)
}
