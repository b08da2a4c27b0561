//! Command-line runner for the ecosim day cycle.
//!
//! Usage: `ecosim [config.json]`
//!
//! Without a path the default configuration is used. `ECOSIM_SEED` overrides
//! the seed and `ECOSIM_STATS=json` prints every day's statistic as a JSON
//! line before the summary.

mod telemetry;

use anyhow::{Context, Result};
use eco_core::SimulationConfig;
use eco_world::Simulation;
use std::path::Path;
use tracing::{info, warn};

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let mut config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => {
            info!("No configuration file given, using defaults");
            SimulationConfig::default()
        }
    };

    if let Ok(seed) = std::env::var("ECOSIM_SEED") {
        match seed.parse() {
            Ok(seed) => config.seed = seed,
            Err(e) => warn!("Ignoring ECOSIM_SEED={}: {}", seed, e),
        }
    }

    let print_days = std::env::var("ECOSIM_STATS")
        .map(|mode| mode.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut simulation = Simulation::new(config)?;

    if print_days {
        for _ in 0..simulation.config().num_days {
            let statistic = simulation.tick();
            println!("{}", serde_json::to_string(statistic)?);
        }
    } else {
        simulation.run();
    }

    print!("{}", simulation.export_summary());
    Ok(())
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration from {}", path.display()))?;
    let config = SimulationConfig::from_json(&json)
        .with_context(|| format!("parsing configuration from {}", path.display()))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
