//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for the server binary
pub const DEFAULT_SERVER_FILTER: &str = "logbook_admin=info,tower_http=debug";

/// Default filter for the review CLI
pub const DEFAULT_CLI_FILTER: &str = "logbook_admin=warn";

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `default_filter`.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Route warnings and errors into the test harness output.
///
/// Safe to call from every test; only the first call installs a subscriber.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_test_writer()
        .try_init();
}
