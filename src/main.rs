use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ukfin::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional profile file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ukfin::AppCommand {
    fn from(cmd: Commands) -> ukfin::AppCommand {
        match cmd {
            Commands::Breakdown => ukfin::AppCommand::Breakdown,
            Commands::Goals => ukfin::AppCommand::Goals,
            Commands::Rate {
                payment,
                target,
                months,
            } => ukfin::AppCommand::Rate {
                monthly_payment: payment,
                target,
                months,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an example profile
    Setup,
    /// Display tax, deductions and the monthly budget
    Breakdown,
    /// Display how long each savings goal takes to reach
    Goals,
    /// Display the return needed to reach a target
    Rate {
        /// Amount saved each month
        #[arg(short, long)]
        payment: f64,
        /// Amount to reach
        #[arg(short, long)]
        target: f64,
        /// Number of monthly payments
        #[arg(short, long)]
        months: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => ukfin::cli::setup::setup_at_path(path),
            None => ukfin::cli::setup::setup(),
        },
        Some(cmd) => ukfin::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
