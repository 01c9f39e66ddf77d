use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the JSON stdout subscriber used by every portal binary.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. Event fields are
/// flattened into the top-level object so log shippers can index them
/// directly. Only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true).with_target(true))
        .try_init();
}
