//! Logging setup for the command-line runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. `ECOSIM_LOG_FORMAT=json` switches
/// the formatter to one JSON object per event.
pub fn init_telemetry() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,eco_world=info".into());

    let json = std::env::var("ECOSIM_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    }

    info!("Telemetry initialized");
    Ok(())
}
