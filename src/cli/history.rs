use super::ui;
use crate::core::ledger::DeleteOutcome;
use crate::core::{AppState, CurrencyCode, HistoryFilter, Transaction, TransactionId};
use anyhow::Result;
use comfy_table::{Cell, Color};
use console::Term;

fn deal_text(tx: &Transaction) -> String {
    format!(
        "{:.0} {} → {:.0} {}",
        tx.from_amount, tx.from_code, tx.to_amount, tx.to_code
    )
}

fn verdict_cell(tx: &Transaction) -> Cell {
    if tx.is_favorable() {
        Cell::new("划算").fg(Color::Green)
    } else {
        Cell::new("昂貴").fg(Color::Red)
    }
}

/// Renders the running profit/loss and the transactions matching the
/// state's history filter.
pub fn render(state: &AppState, reference: CurrencyCode) -> String {
    let total = state.profit_loss(reference);
    let sign = if total >= 0.0 { "+" } else { "" };
    let total_style = if total >= 0.0 {
        ui::StyleType::Gain
    } else {
        ui::StyleType::Loss
    };

    let mut output = format!(
        "{}: {}\n{}\n\n",
        ui::style_text(&format!("總盈虧累計 ({reference})"), ui::StyleType::TotalLabel),
        ui::style_text(&format!("{sign}{total:.2}"), total_style),
        ui::style_text(
            &format!("篩選：{}", state.history_filter()),
            ui::StyleType::Subtle
        )
    );

    let history = state.history();
    if history.is_empty() {
        output.push_str(&ui::style_text("尚無交易紀錄", ui::StyleType::Subtle));
        return output;
    }

    let rates = &state.snapshot().rates;
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Date"),
        ui::header_cell("Exchange"),
        ui::header_cell("Diff"),
        ui::header_cell("Verdict"),
        ui::header_cell(&format!("P/L ({reference})")),
    ]);

    for tx in history {
        let day = tx.date.split(' ').next().unwrap_or(&tx.date);
        table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(day),
            Cell::new(deal_text(tx)),
            ui::diff_cell(tx.diff_percent),
            verdict_cell(tx),
            ui::profit_cell(tx.profit_loss(rates, reference)),
        ]);
    }

    output.push_str(&table.to_string());
    output
}

pub fn run(state: &mut AppState, filter: HistoryFilter, reference: CurrencyCode) -> Result<()> {
    state.set_history_filter(filter);
    println!("{}", render(state, reference));
    Ok(())
}

fn confirm_on_terminal(tx: &Transaction) -> bool {
    let term = Term::stdout();
    let prompt = format!("{} ({}) [y/N] ", "確定要刪除這筆紀錄嗎？", deal_text(tx));
    if term.write_str(&prompt).is_err() {
        return false;
    }
    term.read_line()
        .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
        .unwrap_or(false)
}

/// Deletes a transaction, asking on the terminal unless `assume_yes`.
pub fn delete(state: &mut AppState, id: TransactionId, assume_yes: bool) -> Result<DeleteOutcome> {
    let outcome = state.delete_transaction(id, |tx| assume_yes || confirm_on_terminal(tx))?;
    let message = match outcome {
        DeleteOutcome::Deleted => format!("Deleted transaction {id}"),
        DeleteOutcome::Declined => "Nothing deleted".to_string(),
        DeleteOutcome::NotFound => ui::style_text(
            &format!("No transaction with ID {id}"),
            ui::StyleType::Error,
        ),
    };
    println!("{message}");
    Ok(outcome)
}
