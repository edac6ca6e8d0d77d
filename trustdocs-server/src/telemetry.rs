//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info,trustdocs_rag=debug,tower_http=info";

/// Install the global subscriber. Honors `RUST_LOG`; JSON output when `json`.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = if json { builder.json().try_init() } else { builder.compact().try_init() };
    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing already initialised");
    }
}
