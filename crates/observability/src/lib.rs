//! Tracing/logging setup shared by every process embedding the ledger.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::LogFormat;

/// Environment variable selecting the log format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "HOTEL_LOG_FORMAT";

/// Initialize process-wide observability (tracing/logging).
///
/// Format comes from `HOTEL_LOG_FORMAT` (JSON when unset or unrecognized).
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();
    tracing::init(format);
}
