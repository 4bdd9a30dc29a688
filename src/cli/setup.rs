use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

const EXAMPLE_PROFILE: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example profile to the default profile location.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(path)
}

/// Writes the example profile to `path`, never replacing an existing profile.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            anyhow::bail!("A profile already exists at {}", path.display())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to create profile at {}", path.display()));
        }
    };
    file.write_all(EXAMPLE_PROFILE.as_bytes())
        .with_context(|| format!("Failed to write profile to {}", path.display()))?;

    tracing::info!("Created example profile at {}", path.display());
    println!(
        "Wrote an example profile to {}\nEdit the salary, costs and goals, then run `ukfin breakdown`.",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_setup_creates_nested_profile() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let profile_path = temp_dir.path().join("nested").join("profile.yaml");

        setup_at_path(&profile_path)?;

        let content = fs::read_to_string(&profile_path)?;
        assert_eq!(content, EXAMPLE_PROFILE);
        assert!(content.contains("# Example profile for ukfin"));
        Ok(())
    }

    #[test]
    fn test_setup_keeps_existing_profile() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let profile_path = temp_dir.path().join("profile.yaml");
        fs::write(&profile_path, "profile:\n  gross_salary: 1\n")?;

        let err = setup_at_path(&profile_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(&profile_path)?,
            "profile:\n  gross_salary: 1\n"
        );
        Ok(())
    }

    #[test]
    fn test_example_profile_passes_validation() -> Result<()> {
        let config: AppConfig = serde_yaml::from_str(EXAMPLE_PROFILE)
            .context("Failed to parse example profile as YAML")?;

        config.validate()?;
        assert!(config.profile.gross_salary > 0.0);
        assert!(config.profile.goals.iter().any(|goal| goal.target.is_some()));
        assert!(config.projection.annual_interest > 0.0);
        Ok(())
    }
}
