use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Target prefix of every event the calculator emits.
pub const LOG_TARGET: &str = "ukfin";

fn app_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    }
}

/// Calculation details from the library and binary only; dependency noise
/// stays out even in verbose mode.
fn app_targets(verbose: bool) -> Targets {
    Targets::new().with_target(LOG_TARGET, app_level(verbose))
}

/// Installs the global subscriber. `RUST_LOG` overrides the level chosen by
/// `--verbose`.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(app_level(verbose).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(app_targets(verbose))
        .with(env_filter)
        .init();
}
