//! The fixed set of supported currencies and their display metadata

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::error::QuoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Usd,
    Twd,
    Cny,
    Vnd,
    Hkd,
    Jpy,
    Eur,
    Gbp,
}

/// Static display metadata for a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyMeta {
    pub code: CurrencyCode,
    pub name: &'static str,
    pub symbol: &'static str,
    pub flag: &'static str,
}

impl CurrencyCode {
    pub const COUNT: usize = 8;

    /// Every supported currency, in display order.
    pub const ALL: [CurrencyCode; CurrencyCode::COUNT] = [
        CurrencyCode::Usd,
        CurrencyCode::Twd,
        CurrencyCode::Cny,
        CurrencyCode::Vnd,
        CurrencyCode::Hkd,
        CurrencyCode::Jpy,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
    ];

    /// Position of this code in [`CurrencyCode::ALL`], used to index rate tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Twd => "TWD",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Vnd => "VND",
            CurrencyCode::Hkd => "HKD",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
        }
    }

    pub const fn meta(self) -> CurrencyMeta {
        let (name, symbol, flag) = match self {
            CurrencyCode::Usd => ("美金", "$", "🇺🇸"),
            CurrencyCode::Twd => ("台幣", "NT$", "🇹🇼"),
            CurrencyCode::Cny => ("人民幣", "¥", "🇨🇳"),
            CurrencyCode::Vnd => ("越南盾", "₫", "🇻🇳"),
            CurrencyCode::Hkd => ("港幣", "HK$", "🇭🇰"),
            CurrencyCode::Jpy => ("日圓", "¥", "🇯🇵"),
            CurrencyCode::Eur => ("歐元", "€", "🇪🇺"),
            CurrencyCode::Gbp => ("英鎊", "£", "🇬🇧"),
        };
        CurrencyMeta {
            code: self,
            name,
            symbol,
            flag,
        }
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        CurrencyCode::ALL
            .into_iter()
            .find(|code| code.as_str() == upper)
            .ok_or_else(|| QuoteError::UnknownCurrency(s.to_string()))
    }
}

/// Selects which transactions a history view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Code(CurrencyCode),
}

impl HistoryFilter {
    pub fn matches(&self, from: CurrencyCode, to: CurrencyCode) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Code(code) => *code == from || *code == to,
        }
    }
}

impl Display for HistoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryFilter::All => f.write_str("ALL"),
            HistoryFilter::Code(code) => write!(f, "{code}"),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Ok(HistoryFilter::All);
        }
        s.parse().map(HistoryFilter::Code)
    }
}
