use super::ui;
use crate::core::{Breakdown, GoalPlan, ProjectionSettings, config::AppConfig};
use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Color};
use tracing::info;

fn months_cell(months: &Option<std::result::Result<u32, String>>) -> Cell {
    match months {
        Some(Ok(month)) => Cell::new(month).set_alignment(CellAlignment::Right),
        Some(Err(reason)) => Cell::new(reason).fg(Color::Red),
        None => ui::na_cell(false),
    }
}

pub fn display_goal_plans(plans: &[GoalPlan], settings: &ProjectionSettings) -> String {
    let mut table = ui::new_styled_table();
    let compound_header = format!(
        "Months at {:.2}% a year",
        settings.annual_interest * 100.0
    );
    table.set_header(vec![
        ui::header_cell("Goal"),
        ui::header_cell("Target"),
        ui::header_cell("Monthly"),
        ui::header_cell("Months saving"),
        ui::header_cell(&compound_header),
    ]);

    for plan in plans {
        table.add_row(vec![
            Cell::new(&plan.name),
            ui::money_cell(plan.target),
            ui::money_cell(plan.monthly_payment),
            months_cell(&plan.linear_months),
            months_cell(&plan.compound),
        ]);
    }

    format!(
        "{}\n\n{table}",
        ui::style_text("Goal progress", ui::StyleType::Title)
    )
}

pub fn run(config: &AppConfig) -> Result<()> {
    info!("Projecting savings goals...");
    let breakdown =
        Breakdown::from_profile(&config.profile).context("Failed to compute breakdown")?;
    let plans = breakdown.goal_plans(&config.projection);

    if plans.is_empty() {
        println!("No goals with a target amount found to project.");
        return Ok(());
    }

    println!("{}", display_goal_plans(&plans, &config.projection));
    if config.projection.annual_interest == 0.0 {
        println!(
            "\n{}",
            ui::style_text(
                "Set projection.annual_interest to project growth on savings.",
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
