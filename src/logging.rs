//! Logging setup
//!
//! Everything logs through `tracing`. The subscriber is installed once;
//! later calls are no-ops so tests can call `setup_logging` freely.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set, otherwise `level` is used (e.g. "info", "debug",
/// or a full directive like "cataract_scan=debug,reqwest=warn").
pub fn setup_logging(level: &str) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // try_init: a test harness may already have installed a subscriber
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact())
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_is_idempotent() {
        setup_logging("debug");
        setup_logging("not a valid directive [");
        tracing::info!("logging initialized twice without panicking");
    }
}
