use super::breakdown::{Breakdown, FinanceProfile, ProjectionSettings};
use super::projection::ensure_horizon;
use super::solver::SolverConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub profile: FinanceProfile,
    #[serde(default)]
    pub projection: ProjectionSettings,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("uk", "ukfin", "ukfin")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("profile.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Runs the profile through the calculator once so bad values are
    /// reported at load time.
    pub fn validate(&self) -> Result<()> {
        Breakdown::from_profile(&self.profile)?;
        self.solver.validate()?;
        ensure_horizon(self.projection.horizon_months)
            .context("projection.horizon_months is out of range")?;
        if !self.projection.annual_interest.is_finite() || self.projection.annual_interest <= -1.0 {
            anyhow::bail!("projection.annual_interest must be a finite rate above -100%");
        }
        Ok(())
    }
}
