//! # Shared Helpers
//!
//! Tracing subscriber setup for the CLI binary. Library callers are expected
//! to install their own subscriber; the binary calls [`init_tracing`] once.

use tracing_subscriber::EnvFilter;

/// Default log filter for a `-v` count, used when `RUST_LOG` is unset
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global stderr subscriber.
///
/// `RUST_LOG` overrides the verbosity flag when set.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
