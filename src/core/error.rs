use thiserror::Error;

use super::currency::CurrencyCode;

/// Validation failures for rates, amounts and currency codes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Rate snapshot is missing currency: {0}")]
    MissingRate(CurrencyCode),

    #[error("Invalid rate for {code}: {value}")]
    InvalidRate { code: CurrencyCode, value: f64 },

    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    #[error("Exchange of {from_amount} for {to_amount} is out of range")]
    OutOfRange { from_amount: f64, to_amount: f64 },
}
