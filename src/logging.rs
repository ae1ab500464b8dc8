//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays free for command output (alerts).
//! `RUST_LOG`, when set, overrides the configured level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const DEFAULT_LEVEL: &str = "info";
pub const DEFAULT_FORMAT: &str = "pretty";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Whether `level` is one of the five tracing levels (any case).
pub fn is_valid_level(level: &str) -> bool {
    LEVELS.contains(&level.trim().to_lowercase().as_str())
}

/// Whether `format` is `pretty` or `json`.
pub fn is_valid_format(format: &str) -> bool {
    matches!(format.trim().to_lowercase().as_str(), "pretty" | "json")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Installs the global subscriber. A second call is a no-op.
///
/// * `level` - base level (trace, debug, info, warn, error)
/// * `format` - "json" for structured lines, anything else for human-readable
pub fn init_logging(level: &str, format: &str) {
    let subscriber = tracing_subscriber::registry().with(build_filter(level));

    if format.eq_ignore_ascii_case("json") {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(level, format, "logging initialized");
}
