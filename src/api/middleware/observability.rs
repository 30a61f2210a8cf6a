//! Observability setup.
//!
//! Installs the global tracing subscriber.

use std::env;
use tracing_subscriber::EnvFilter;

/// Initialize tracing.
///
/// `RUST_LOG` controls the filter (default `info`); `LOG_FORMAT=json` switches
/// to structured JSON lines. Output goes to stderr without ANSI colors.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}
