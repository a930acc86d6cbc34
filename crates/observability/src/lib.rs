//! Tracing/logging setup shared by the binaries.
//!
//! Library crates in this workspace emit spans and events but never install
//! a subscriber; only an entry point calls [`init`].

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
