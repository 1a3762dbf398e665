//! Diagnostic logging via `tracing`
//!
//! Report output goes to stdout with `println!`; everything here goes to
//! stderr so the two never interleave in redirected output.

use tracing_subscriber::{fmt, EnvFilter};

/// Map -v / -q counts onto a default filter directive
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; `RUST_LOG` wins over the CLI flags
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A subscriber may already be set (e.g. by a test harness)
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
