//! Internal instrumentation. `scopegraph` is a library with no CLI surface
//! of its own, so there's no `init_with_config`/config-file wiring here,
//! only a thin, idempotent helper for embedders and tests to install a
//! default subscriber.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a default `tracing-subscriber` layer once per process. Safe to
/// call multiple times; only the first call takes effect. `RUST_LOG` is
/// honored if set, otherwise falls back to `warn`.
pub fn init_test_subscriber() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

/// Debug-only event logging: `[handler] event` or `[handler] event: args`.
#[macro_export]
macro_rules! debug_event {
    ($handler:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $handler, $event)
    };
    ($handler:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $handler, $event, format!($($arg)*))
    };
}
