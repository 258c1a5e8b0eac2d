//! Compares an offered exchange against the market cross rate

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::info;

use super::currency::CurrencyCode;
use super::error::QuoteError;
use super::ledger::{Ledger, Transaction, TransactionId};
use super::rates::Rates;

/// An exchange someone offered: give `from_amount` of `from`, get `to_amount` of `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offer {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub from_amount: f64,
    pub to_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub market_rate: f64,
    pub effective_rate: f64,
    pub diff_percent: f64,
}

impl Comparison {
    /// Positive difference means the offer gives more than the market.
    pub fn is_better_for_me(&self) -> bool {
        self.diff_percent > 0.0
    }
}

/// Units of `to` per 1 unit of `from` at the given rates.
pub fn market_rate(rates: &Rates, from: CurrencyCode, to: CurrencyCode) -> f64 {
    rates.cross(from, to)
}

/// Realized rate of an exchange. `None` unless `from_amount` is positive.
pub fn effective_rate(from_amount: f64, to_amount: f64) -> Option<f64> {
    (from_amount > 0.0).then(|| to_amount / from_amount)
}

pub fn diff_percent(effective_rate: f64, market_rate: f64) -> f64 {
    (effective_rate - market_rate) / market_rate * 100.0
}

pub fn compare(rates: &Rates, offer: &Offer) -> Result<Comparison, QuoteError> {
    let effective_rate = effective_rate(offer.from_amount, offer.to_amount)
        .ok_or(QuoteError::NonPositiveAmount(offer.from_amount))?;
    let market_rate = market_rate(rates, offer.from, offer.to);
    let diff_percent = diff_percent(effective_rate, market_rate);
    if !(effective_rate.is_finite() && market_rate.is_finite() && diff_percent.is_finite()) {
        return Err(out_of_range(offer));
    }
    Ok(Comparison {
        market_rate,
        effective_rate,
        diff_percent,
    })
}

fn out_of_range(offer: &Offer) -> QuoteError {
    QuoteError::OutOfRange {
        from_amount: offer.from_amount,
        to_amount: offer.to_amount,
    }
}

/// Freezes the comparison of `offer` at the current rates and prepends it to
/// the ledger. This is the only way transactions are created.
pub fn record_transaction(
    ledger: &mut Ledger,
    rates: &Rates,
    offer: &Offer,
    now: DateTime<Local>,
) -> Result<Transaction> {
    if offer.to_amount <= 0.0 {
        return Err(QuoteError::NonPositiveAmount(offer.to_amount).into());
    }
    let comparison = compare(rates, offer)?;

    let tx = Transaction {
        id: TransactionId::next(now, ledger.latest_id()),
        date: now.format(Transaction::DATE_FORMAT).to_string(),
        from_code: offer.from,
        to_code: offer.to,
        from_amount: offer.from_amount,
        to_amount: offer.to_amount,
        market_rate: comparison.market_rate,
        diff_percent: comparison.diff_percent,
        note: String::new(),
    };
    if !tx.is_finite() {
        return Err(out_of_range(offer).into());
    }
    ledger.append(tx.clone())?;
    info!(id = %tx.id, diff_percent = tx.diff_percent, "Recorded transaction");
    Ok(tx)
}
