//! Core business logic: rates, conversion, comparison and the ledger

pub mod comparison;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod fetcher;
pub mod ledger;
pub mod log;
pub mod rates;
pub mod state;
pub mod storage;

// Re-export main types for cleaner imports
pub use comparison::{Comparison, Offer};
pub use currency::{CurrencyCode, HistoryFilter};
pub use error::QuoteError;
pub use fetcher::{RateProvider, RateQuote};
pub use ledger::{Ledger, Transaction, TransactionId};
pub use rates::{MarketInsight, RateSnapshot, Rates};
pub use state::AppState;
