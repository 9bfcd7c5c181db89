//! Plain-text rendering of simulation results.

use colored::Colorize;

use crate::money::format_amount;
use crate::simulation::{BudgetComparison, MonthlyRecord, PayoffOutcome, PayoffReport, Strategy};

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Left,
        }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Right,
        }
    }
}

/// Minimal fixed-width table with a header rule.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mut width = column.header.chars().count();
                for row in &self.rows {
                    if let Some(cell) = row.get(idx) {
                        width = width.max(cell.chars().count());
                    }
                }
                width
            })
            .collect()
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let text = row.get(idx).map(|s| s.as_str()).unwrap_or("");
                let pad = widths[idx].saturating_sub(text.chars().count());
                match column.alignment {
                    Alignment::Left => format!("{}{}", text, " ".repeat(pad)),
                    Alignment::Right => format!("{}{}", " ".repeat(pad), text),
                }
            })
            .collect();
        cells.join("  ").trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut out = String::new();
        out.push_str(&self.render_row(&headers, &widths));
        out.push('\n');
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(rule_width));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&self.render_row(row, &widths));
        }
        out
    }
}

fn outcome_cells(
    outcome: &PayoffOutcome,
    total_interest: f64,
    total_paid: Option<f64>,
) -> (String, String, String) {
    match outcome {
        PayoffOutcome::PaidOff { months } => (
            months.to_string(),
            format_amount(total_interest),
            total_paid.map(format_amount).unwrap_or_else(|| "-".into()),
        ),
        PayoffOutcome::NonConvergent { .. } => {
            ("does not pay off".into(), "-".into(), "-".into())
        }
    }
}

/// Comparison table: one row per monthly budget.
pub fn render_comparison(strategy: Strategy, rows: &[BudgetComparison]) -> String {
    let mut table = Table::new(vec![
        TableColumn::right("Budget/mo"),
        TableColumn::right("Months"),
        TableColumn::right("Total interest"),
        TableColumn::right("Total paid"),
    ]);
    for row in rows {
        let (months, interest, paid) =
            outcome_cells(&row.outcome, row.total_interest, row.total_paid);
        table.push_row(vec![
            format_amount(row.monthly_budget),
            months,
            interest,
            paid,
        ]);
    }
    format!(
        "{}\n{}",
        format!("Comparison (strategy: {})", strategy.label()).bold(),
        table.render()
    )
}

/// Multi-line summary of a single run.
pub fn render_summary(report: &PayoffReport) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!(
            "{}/mo — {}",
            format_amount(report.monthly_budget),
            report.strategy.label()
        )
        .bold()
        .to_string(),
    );
    match report.outcome {
        PayoffOutcome::PaidOff { months } => {
            lines.push(format!("Months to payoff: {}", months));
            lines.push(format!(
                "Total interest:   {}",
                format_amount(report.total_interest)
            ));
            if let Some(total_paid) = report.total_paid() {
                lines.push(format!("Total paid:       {}", format_amount(total_paid)));
            }
        }
        PayoffOutcome::NonConvergent { months_elapsed } => {
            lines.push(
                format!(
                    "Does not pay off: balances stop shrinking after {} month(s). Try a larger budget.",
                    months_elapsed
                )
                .red()
                .to_string(),
            );
        }
    }
    lines.join("\n")
}

/// Full month-by-month schedule with one balance column per card.
pub fn render_schedule(schedule: &[MonthlyRecord]) -> String {
    let Some(first) = schedule.first() else {
        return "No months simulated.".into();
    };
    let card_names: Vec<String> = first.balances.keys().cloned().collect();

    let mut columns = vec![
        TableColumn::right("Month"),
        TableColumn::right("Interest"),
        TableColumn::right("Payment"),
    ];
    for name in &card_names {
        columns.push(TableColumn::right(name.clone()));
    }
    columns.push(TableColumn::right("Total"));

    let mut table = Table::new(columns);
    for record in schedule {
        let mut row = vec![
            record.month.to_string(),
            format_amount(record.interest_accrued),
            format_amount(record.payment_applied),
        ];
        for name in &card_names {
            let balance = record.balances.get(name).copied().unwrap_or(0.0);
            row.push(format_amount(balance));
        }
        row.push(format_amount(record.total_balance));
        table.push_row(row);
    }
    table.render()
}
