//! Application state owned by the top-level controller

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::debug;

use super::comparison::{self, Comparison, Offer};
use super::config::default_visible_currencies;
use super::conversion::Converter;
use super::currency::{CurrencyCode, HistoryFilter};
use super::error::QuoteError;
use super::fetcher::{RateProvider, fetch_latest_rates};
use super::ledger::{DeleteOutcome, Ledger, Transaction, TransactionId};
use super::rates::{MarketInsight, RateSnapshot};

/// Every piece of mutable state. Views read it and change it only through
/// these methods.
pub struct AppState {
    snapshot: RateSnapshot,
    insight: Option<MarketInsight>,
    converter: Converter,
    ledger: Ledger,
    visible: Vec<CurrencyCode>,
    history_filter: HistoryFilter,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            snapshot: RateSnapshot::loading(),
            insight: None,
            converter: Converter::default(),
            ledger,
            visible: default_visible_currencies(),
            history_filter: HistoryFilter::default(),
        }
    }

    pub fn with_visible(mut self, visible: Vec<CurrencyCode>) -> Self {
        if !visible.is_empty() {
            self.visible = visible;
        }
        self
    }

    pub fn snapshot(&self) -> &RateSnapshot {
        &self.snapshot
    }

    pub fn insight(&self) -> Option<&MarketInsight> {
        self.insight.as_ref()
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn visible(&self) -> &[CurrencyCode] {
        &self.visible
    }

    pub fn history_filter(&self) -> HistoryFilter {
        self.history_filter
    }

    /// Replaces the snapshot and insight wholesale with freshly fetched ones.
    pub async fn refresh(&mut self, provider: &(dyn RateProvider + Send + Sync)) {
        let (snapshot, insight) = fetch_latest_rates(provider).await;
        debug!(freshness = %snapshot.freshness, "Adopting rate snapshot");
        self.snapshot = snapshot;
        self.insight = Some(insight);
    }

    pub fn set_amount(&mut self, code: CurrencyCode, value: f64) -> Result<(), QuoteError> {
        self.converter.set_amount(&self.snapshot.rates, code, value)
    }

    pub fn amount(&self, code: CurrencyCode) -> f64 {
        self.converter.amount(&self.snapshot.rates, code)
    }

    pub fn compare(&self, offer: &Offer) -> Result<Comparison, QuoteError> {
        comparison::compare(&self.snapshot.rates, offer)
    }

    pub fn save_offer(&mut self, offer: &Offer, now: DateTime<Local>) -> Result<Transaction> {
        comparison::record_transaction(&mut self.ledger, &self.snapshot.rates, offer, now)
    }

    pub fn delete_transaction<F>(&mut self, id: TransactionId, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(&Transaction) -> bool,
    {
        self.ledger.delete(id, confirm)
    }

    /// Transactions matching the selected history filter.
    pub fn history(&self) -> Vec<&Transaction> {
        self.ledger.filter(self.history_filter)
    }

    pub fn profit_loss(&self, reference: CurrencyCode) -> f64 {
        self.ledger
            .aggregate_profit_loss(&self.snapshot.rates, reference)
    }

    pub fn set_history_filter(&mut self, filter: HistoryFilter) {
        self.history_filter = filter;
    }

    /// Shows `code` in display slot `slot`. Out-of-range slots are ignored.
    pub fn replace_visible(&mut self, slot: usize, code: CurrencyCode) -> bool {
        match self.visible.get_mut(slot) {
            Some(current) => {
                *current = code;
                true
            }
            None => false,
        }
    }
}
