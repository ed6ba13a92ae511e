//! Tracing setup.
//!
//! Hosts embedding the core can install their own subscriber instead; this
//! is the default stderr setup driven by the `LOG` env var.

use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.parse().expect("valid default directive"))
        .with_env_var("LOG")
        .from_env_lossy()
}

/// Install the global stderr subscriber. Call once at startup.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(std::io::stderr)
        .init();
}

/// Best-effort init for tests; repeated calls are fine.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .with_test_writer()
        .try_init();
}
