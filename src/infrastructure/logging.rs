use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// Quieter dependencies, debug detail for our own request handling.
pub const DEFAULT_DIRECTIVES: &str = "info,storefront_api=debug";

pub fn init_logging() {
    // RUST_LOG overrides the crate defaults
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
