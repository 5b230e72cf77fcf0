//! Log output for the certdesk binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "CERTDESK_LOG";
const DEFAULT_LOG_FILTER: &str = "certdesk=warn";
const VERBOSE_LOG_FILTER: &str = "certdesk=debug";

/// Install a stderr subscriber.
///
/// `CERTDESK_LOG` takes precedence; otherwise `verbose` picks between the
/// default and debug filters.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) is not an error worth surfacing
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
