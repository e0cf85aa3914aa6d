// Each module handles one subcommand; main.rs only parses and dispatches.

pub mod layers;
pub mod trip;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use tripcarbon_lib::{resolve_data_dir, EmissionEngine, ReferenceData, RoutingServices, Settings};

/// Settings from the optional override file, with environment overrides
/// applied to the routing endpoints.
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.routing = settings.routing.with_env_overrides();
    Ok(settings)
}

/// Resolve the data directory and load both reference layers.
pub fn load_reference(data_dir: Option<&Path>) -> Result<(PathBuf, ReferenceData)> {
    let dir = resolve_data_dir(data_dir).context("failed to resolve the data directory")?;
    let reference = ReferenceData::load(&dir)
        .with_context(|| format!("failed to load reference layers from {}", dir.display()))?;
    Ok((dir, reference))
}

/// Engine backed by the HTTP routing services.
pub fn build_engine(data_dir: Option<&Path>, config: Option<&Path>) -> Result<EmissionEngine> {
    let settings = load_settings(config)?;
    let (_, reference) = load_reference(data_dir)?;
    let services = RoutingServices::from_config(&settings.routing)
        .context("failed to initialise the routing services")?;
    Ok(EmissionEngine::new(services, Arc::new(reference), settings))
}
