//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout stays reserved for reports. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,xlfsync=debug";

pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_ansi(std::env::var_os("NO_COLOR").is_none())
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)));

    // Already installed when embedded or called twice.
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
