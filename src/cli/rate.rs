use super::ui;
use crate::core::{FinanceError, RequiredReturn, SolverConfig, required_return_rate};
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use tracing::info;

pub fn display_required_return(
    monthly_payment: f64,
    target: f64,
    months: u32,
    result: &RequiredReturn,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Required return"), ui::header_cell("Rate")]);
    table.add_row(vec![Cell::new("Monthly"), ui::percentage_cell(result.monthly_rate)]);
    table.add_row(vec![Cell::new("Annual"), ui::percentage_cell(result.annual_rate)]);

    format!(
        "{} {} over {months} months to reach {}\n\n{table}",
        ui::style_text("Saving", ui::StyleType::Title),
        ui::format_money(monthly_payment),
        ui::format_money(target),
    )
}

pub fn run(monthly_payment: f64, target: f64, months: u32, solver: &SolverConfig) -> Result<()> {
    info!("Solving required return for {target} over {months} months...");
    let result =
        required_return_rate(monthly_payment, target, months, solver).map_err(|e| match e {
            FinanceError::NoConvergence { iterations } => anyhow!(
                "No return rate reaches {target} from {months} payments of {monthly_payment} (gave up after {iterations} iterations)"
            ),
            other => anyhow!(other),
        })?;

    println!(
        "{}",
        display_required_return(monthly_payment, target, months, &result)
    );
    Ok(())
}
