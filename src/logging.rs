//! Optional startup hook that wires up a `tracing-subscriber` formatter.
//!
//! Disabled by default. Enable the `setup_tracing` feature and set
//! `MTREE_LOG` to a truthy value to see `debug!`-level node-splitting and
//! balancing detail while running tests or benches.

#[cfg(feature = "setup_tracing")]
use ctor::ctor;
#[cfg(feature = "setup_tracing")]
use tracing::Level;

#[cfg(feature = "setup_tracing")]
#[ctor]
fn init_tracing() {
    if std::env::var("MTREE_LOG").map_or(true, |v| v == "0" || v == "false" || v.is_empty()) {
        // Logging stays disabled; tracing macros are no-ops without a subscriber.
    } else {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
    }
}
