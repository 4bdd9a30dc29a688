use super::ui;
use crate::core::{Breakdown, config::AppConfig};
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::info;

impl Breakdown {
    pub fn display_as_table(&self) -> String {
        let mut deductions = ui::new_styled_table();
        deductions.set_header(vec![
            ui::header_cell("Item"),
            ui::header_cell("Annual"),
            ui::header_cell("Monthly"),
        ]);
        let lines = [
            ("Gross salary", self.gross),
            ("Income tax", self.income_tax),
            ("National Insurance", self.national_insurance),
            ("Student loan", self.student_loan),
            ("Pension", self.pension),
        ];
        for (label, amount) in lines {
            deductions.add_row(vec![
                Cell::new(label),
                ui::money_cell(amount.annual),
                ui::money_cell(amount.monthly),
            ]);
        }
        deductions.add_row(vec![
            Cell::new(ui::style_text("Disposable income", ui::StyleType::TotalLabel)),
            ui::total_money_cell(self.disposable.annual),
            ui::total_money_cell(self.disposable.monthly),
        ]);

        let mut budget = ui::new_styled_table();
        budget.set_header(vec![ui::header_cell("Monthly budget"), ui::header_cell("Amount")]);
        budget.add_row(vec![
            Cell::new("Disposable income"),
            ui::money_cell(self.disposable.monthly),
        ]);
        budget.add_row(vec![Cell::new("Fixed costs"), ui::money_cell(-self.fixed_costs)]);
        budget.add_row(vec![Cell::new("Personal income"), ui::money_cell(self.personal)]);
        budget.add_row(vec![Cell::new("Savings"), ui::money_cell(self.savings)]);
        budget.add_row(vec![
            Cell::new(ui::style_text("Left to spend", ui::StyleType::TotalLabel)),
            ui::total_money_cell(self.spending),
        ]);

        let mut output = format!(
            "{}\n\n{deductions}\n\n{budget}",
            ui::style_text("Income breakdown", ui::StyleType::Title)
        );

        if !self.goals.is_empty() {
            let mut goals = ui::new_styled_table();
            goals.set_header(vec![
                ui::header_cell("Goal"),
                ui::header_cell("Share of savings"),
                ui::header_cell("Monthly"),
                ui::header_cell("Target"),
            ]);
            for goal in &self.goals {
                goals.add_row(vec![
                    Cell::new(&goal.name),
                    ui::percentage_cell(goal.allocation),
                    ui::money_cell(goal.amount),
                    ui::format_optional_cell(goal.target, ui::format_money),
                ]);
            }
            output.push_str(&format!(
                "\n\n{}\n\n{goals}",
                ui::style_text("Savings goals", ui::StyleType::Title)
            ));
        }

        output
    }
}

pub fn run(config: &AppConfig) -> Result<()> {
    info!("Computing income breakdown...");
    let breakdown =
        Breakdown::from_profile(&config.profile).context("Failed to compute breakdown")?;
    println!("{}", breakdown.display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core::{Breakdown, FinanceProfile, FixedCost, Goal, StudentLoanPlan};

    fn profile() -> FinanceProfile {
        FinanceProfile {
            gross_salary: 60_000.0,
            student_loan_plan: StudentLoanPlan::Plan1,
            pension_fraction: 0.05,
            fixed_costs: vec![FixedCost::new("Rent", 1_200.0)],
            savings_fraction: 0.25,
            goals: vec![Goal::new("Car", 1.0, Some(12_000.0))],
        }
    }

    #[test]
    fn table_lists_every_deduction() {
        let breakdown = Breakdown::from_profile(&profile()).unwrap();
        let output = breakdown.display_as_table();

        for label in [
            "Gross salary",
            "Income tax",
            "National Insurance",
            "Student loan",
            "Pension",
            "Disposable income",
            "Fixed costs",
            "Left to spend",
            "Car",
        ] {
            assert!(output.contains(label), "missing {label} in\n{output}");
        }
        assert!(output.contains("£60000.00"));
        assert!(output.contains("£5000.00"));
        assert!(output.contains("-£1200.00"));
    }

    #[test]
    fn goals_table_is_omitted_without_goals() {
        let mut profile = profile();
        profile.goals.clear();
        let output = Breakdown::from_profile(&profile).unwrap().display_as_table();
        assert!(!output.contains("Savings goals"));
    }
}
