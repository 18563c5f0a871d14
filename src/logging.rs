use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: Once = Once::new();

/// Installs a compact stderr subscriber, once per process. `RUST_LOG` wins
/// over `verbose` when set. stdout is left to the demo transcript.
pub fn init(verbose: bool) {
    TRACING_INIT.call_once(|| {
        let fallback = if verbose { "example=debug" } else { "example=info" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(false)
            .compact();

        // A host process may already own the global subscriber; its events go there.
        if let Err(err) = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
        {
            tracing::debug!(error = %err, "global subscriber already set, keeping it");
        }
    });
}
