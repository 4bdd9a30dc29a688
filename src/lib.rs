pub mod cli;
pub mod core;

use crate::core::{SolverConfig, config::AppConfig};
use anyhow::Result;
use tracing::debug;

/// Commands that run against a finance profile or standalone inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Breakdown,
    Goals,
    Rate {
        monthly_payment: f64,
        target: f64,
        months: u32,
    },
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Breakdown => cli::breakdown::run(&load_config(config_path)?),
        AppCommand::Goals => cli::goals::run(&load_config(config_path)?),
        AppCommand::Rate {
            monthly_payment,
            target,
            months,
        } => {
            // Solver limits come from the profile only when one is named
            let solver = match config_path {
                Some(_) => load_config(config_path)?.solver,
                None => SolverConfig::default(),
            };
            cli::rate::run(monthly_payment, target, months, &solver)
        }
    }
}
