use super::ui;
use crate::core::conversion::format_amount;
use crate::core::{AppState, CurrencyCode};
use anyhow::{Result, bail};
use comfy_table::Cell;

/// Renders the conversion grid for `codes`, followed by the market insight.
pub fn render(state: &AppState, codes: &[CurrencyCode]) -> String {
    let rates = &state.snapshot().rates;
    let active = state.converter().active();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Name"),
        ui::header_cell("Amount"),
        ui::header_cell("Per USD"),
    ]);

    for &code in codes {
        let meta = code.meta();
        let label = if code == active {
            format!("{} {} *", meta.flag, code)
        } else {
            format!("{} {}", meta.flag, code)
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(meta.name),
            ui::amount_cell(format!("{}{}", meta.symbol, format_amount(state.amount(code)))),
            ui::amount_cell(format_amount(rates.get(code))),
        ]);
    }

    let mut output = table.to_string();

    if let Some(insight) = state.insight() {
        output.push_str(&format!(
            "\n\n{}\n{}",
            ui::style_text("市場觀察", ui::StyleType::Title),
            insight.summary
        ));
        if let Some(source) = insight.sources.first() {
            let title: String = source.title.chars().take(30).collect();
            output.push_str(&format!(
                "\n{}",
                ui::style_text(&format!("來源：{title}... {}", source.uri), ui::StyleType::Subtle)
            ));
        }
    }

    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!("最後更新：{}", state.snapshot().freshness.label()),
            ui::StyleType::Subtle
        )
    ));
    output
}

pub fn run(
    state: &mut AppState,
    edit: Option<(CurrencyCode, f64)>,
    show: Option<(usize, CurrencyCode)>,
    show_all: bool,
) -> Result<()> {
    if let Some((code, value)) = edit {
        state.set_amount(code, value)?;
    }
    if let Some((slot, code)) = show {
        if !state.replace_visible(slot, code) {
            bail!(
                "No display slot {}, there are {}",
                slot + 1,
                state.visible().len()
            );
        }
    }

    let codes: Vec<CurrencyCode> = if show_all {
        CurrencyCode::ALL.to_vec()
    } else {
        state.visible().to_vec()
    };
    println!("{}", render(state, &codes));
    Ok(())
}
