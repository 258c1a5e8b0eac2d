use super::ui;
use crate::core::conversion::format_amount;
use crate::core::{AppState, Comparison, Offer};
use anyhow::Result;
use chrono::Local;

pub fn render(offer: &Offer, comparison: &Comparison) -> String {
    let (verdict, style_type) = if comparison.is_better_for_me() {
        ("較市場划算", ui::StyleType::Gain)
    } else {
        ("較市場昂貴", ui::StyleType::Loss)
    };

    let mut output = format!(
        "{} {} {} → {} {}\n\n",
        ui::style_text("Offer:", ui::StyleType::TotalLabel),
        format_amount(offer.from_amount),
        offer.from,
        format_amount(offer.to_amount),
        offer.to
    );
    output.push_str(&format!(
        "{}  {}\n",
        ui::style_text(verdict, style_type),
        ui::style_text(
            &format!("{:.2}%", comparison.diff_percent.abs()),
            ui::gain_or_loss(comparison.diff_percent)
        )
    ));
    output.push_str(&ui::style_text(
        &format!(
            "市場匯率 1 : {:.2}\n友情報價 1 : {:.2}",
            comparison.market_rate, comparison.effective_rate
        ),
        ui::StyleType::Subtle,
    ));
    output
}

pub fn run(state: &mut AppState, offer: &Offer, save: bool) -> Result<()> {
    let comparison = state.compare(offer)?;
    println!("{}", render(offer, &comparison));

    if save {
        let tx = state.save_offer(offer, Local::now())?;
        println!("\n已儲存紀錄！ (ID {})", tx.id);
    }
    Ok(())
}
