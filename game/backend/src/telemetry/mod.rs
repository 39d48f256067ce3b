//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter, prelude::*};

/// Initialize global tracing subscriber with env filter.
///
/// Use RUST_LOG to configure, e.g.:
/// RUST_LOG=debug,pairs::game=trace,tower_http=info
pub fn init() {
    let fmt_layer = fmt::layer()
        .with_target(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,axum=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

static TEST_INIT: Once = Once::new();

/// Quiet subscriber for tests, safe to call from every test.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init_for_tests() {
    TEST_INIT.call_once(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}
