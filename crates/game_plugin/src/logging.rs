// crates/game_plugin/src/logging.rs

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Install a subscriber for this library's copy of `tracing`. A hot-loaded
/// dylib does not share the host's dispatcher, so without this every event
/// emitted by the game is dropped. Idempotent; `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact();
        // Another copy of the module may already own the global slot.
        let _ = subscriber.try_init();
    });
}
