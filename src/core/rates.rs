//! USD-relative rate tables and the snapshot that carries them

use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

use super::currency::CurrencyCode;
use super::error::QuoteError;

/// Units of each currency per 1 USD. Every code is always present and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    values: [f64; CurrencyCode::COUNT],
}

impl Rates {
    /// Builds a rate table from one value per code, in [`CurrencyCode::ALL`] order.
    ///
    /// Values are rebased so that USD is exactly 1.
    pub fn new(values: [f64; CurrencyCode::COUNT]) -> Result<Self, QuoteError> {
        Self::check(&values)?;

        let usd = values[CurrencyCode::Usd.index()];
        if usd == 1.0 {
            return Ok(Self { values });
        }
        debug!(usd, "Rebasing rates so that USD is 1");
        let values = values.map(|v| v / usd);
        Self::check(&values)?;
        Ok(Self { values })
    }

    fn check(values: &[f64; CurrencyCode::COUNT]) -> Result<(), QuoteError> {
        for code in CurrencyCode::ALL {
            let value = values[code.index()];
            if !value.is_finite() || value <= 0.0 {
                return Err(QuoteError::InvalidRate { code, value });
            }
        }
        Ok(())
    }

    /// Builds a rate table from an untyped code-to-value map.
    ///
    /// Every supported code must be present. Unknown keys are ignored. An
    /// exact upper-case key wins over other spellings of the same code.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, QuoteError> {
        let mut values = [0.0; CurrencyCode::COUNT];
        for code in CurrencyCode::ALL {
            let value = map
                .get(code.as_str())
                .or_else(|| {
                    map.iter()
                        .filter(|(key, _)| key.eq_ignore_ascii_case(code.as_str()))
                        .min_by(|a, b| a.0.cmp(b.0))
                        .map(|(_, v)| v)
                })
                .copied()
                .ok_or(QuoteError::MissingRate(code))?;
            values[code.index()] = value;
        }

        for key in map.keys() {
            if key.parse::<CurrencyCode>().is_err() {
                debug!(key = %key, "Ignoring unsupported currency in rate map");
            }
        }

        Self::new(values)
    }

    /// Illustrative rates used whenever live rates cannot be retrieved.
    pub fn fallback() -> Self {
        Self {
            values: [1.0, 32.5, 7.24, 25400.0, 7.8, 155.0, 0.92, 0.78],
        }
    }

    pub fn get(&self, code: CurrencyCode) -> f64 {
        self.values[code.index()]
    }

    /// Cross rate: units of `to` per 1 unit of `from`.
    pub fn cross(&self, from: CurrencyCode, to: CurrencyCode) -> f64 {
        self.get(to) / self.get(from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CurrencyCode, f64)> + '_ {
        CurrencyCode::ALL
            .into_iter()
            .map(move |code| (code, self.get(code)))
    }
}

/// How current a snapshot's rates are.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    /// Placeholder values shown before the first fetch completes.
    Loading,
    Live(DateTime<Local>),
    Fallback,
}

impl Freshness {
    pub fn is_live(&self) -> bool {
        matches!(self, Freshness::Live(_))
    }

    pub fn label(&self) -> String {
        match self {
            Freshness::Loading => "正在載入...".to_string(),
            Freshness::Live(at) => at.format("%H:%M:%S").to_string(),
            Freshness::Fallback => "Fallback (Network Error)".to_string(),
        }
    }
}

impl Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub rates: Rates,
    pub freshness: Freshness,
}

impl RateSnapshot {
    pub fn loading() -> Self {
        Self {
            rates: Rates::fallback(),
            freshness: Freshness::Loading,
        }
    }

    pub fn fallback() -> Self {
        Self {
            rates: Rates::fallback(),
            freshness: Freshness::Fallback,
        }
    }

    pub fn live(rates: Rates, at: DateTime<Local>) -> Self {
        Self {
            rates,
            freshness: Freshness::Live(at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Short market commentary with the citations it was grounded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketInsight {
    pub summary: String,
    pub sources: Vec<Source>,
}

impl MarketInsight {
    pub const DEFAULT_SUMMARY: &'static str = "目前匯率保持穩定。";
    pub const FALLBACK_SUMMARY: &'static str = "無法取得即時匯率，目前顯示預設參考值。";

    pub fn fallback() -> Self {
        Self {
            summary: Self::FALLBACK_SUMMARY.to_string(),
            sources: Vec::new(),
        }
    }
}
