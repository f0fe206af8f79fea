//! Diagnostic output setup.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable enabling diagnostics. Its value is an `EnvFilter`
/// directive such as `fvp::pick=debug`; `1` means `debug` for everything.
pub const ENV_TRACE: &str = "FVP_TRACE";

/// Install a global `fmt` subscriber if `FVP_TRACE` is set.
///
/// Returns false if diagnostics are off or a subscriber was already set.
pub fn init_tracing() -> bool {
    let Ok(directives) = std::env::var(ENV_TRACE) else {
        return false;
    };
    let directives = match directives.trim() {
        "" | "0" => return false,
        "1" => "debug",
        other => other,
    };
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("debug"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
