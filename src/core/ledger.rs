//! Persisted history of recorded exchanges and their profit/loss

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::num::ParseIntError;
use std::sync::Arc;
use tracing::{debug, info};

use super::currency::{CurrencyCode, HistoryFilter};
use super::rates::Rates;
use super::storage::KeyValueStore;

/// Storage key holding the whole ledger as a JSON array.
pub const LEDGER_KEY: &str = "quickswap_history";

/// Creation-ordered transaction identifier, stored as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(u64);

impl TransactionId {
    /// Milliseconds since the epoch at `now`, moved past `latest` if the
    /// clock has not advanced.
    pub fn next(now: DateTime<Local>, latest: Option<TransactionId>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match latest {
            Some(TransactionId(prev)) if prev >= millis => TransactionId(prev.saturating_add(1)),
            _ => TransactionId(millis),
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TransactionId {
    fn from(value: u64) -> Self {
        TransactionId(value)
    }
}

impl TryFrom<String> for TransactionId {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransactionId> for String {
    fn from(id: TransactionId) -> Self {
        id.0.to_string()
    }
}

impl std::str::FromStr for TransactionId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TransactionId)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub date: String,
    pub from_code: CurrencyCode,
    pub to_code: CurrencyCode,
    pub from_amount: f64,
    pub to_amount: f64,
    /// Units of `to_code` per `from_code` when the transaction was recorded.
    pub market_rate: f64,
    pub diff_percent: f64,
    #[serde(default)]
    pub note: String,
}

impl Transaction {
    pub const DATE_FORMAT: &'static str = "%Y/%m/%d %H:%M:%S";

    pub fn is_favorable(&self) -> bool {
        self.diff_percent > 0.0
    }

    /// Whether every stored figure can round-trip through JSON.
    pub fn is_finite(&self) -> bool {
        [
            self.from_amount,
            self.to_amount,
            self.market_rate,
            self.diff_percent,
            self.market_to_amount(),
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Amount of `to_code` the market would have given at the frozen rate.
    pub fn market_to_amount(&self) -> f64 {
        self.from_amount * self.market_rate
    }

    /// Gain or loss against the frozen market rate, valued in `reference` at
    /// the given (current) rates.
    pub fn profit_loss(&self, rates: &Rates, reference: CurrencyCode) -> f64 {
        let delta = self.to_amount - self.market_to_amount();
        delta * rates.cross(self.to_code, reference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    NotFound,
}

/// Most-recent-first list of transactions, rewritten in full on every change.
pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let transactions = match store.get(LEDGER_KEY)? {
            Some(bytes) => serde_json::from_slice::<Vec<Transaction>>(&bytes)
                .context("Failed to parse stored transaction history")?,
            None => Vec::new(),
        };
        debug!(count = transactions.len(), "Loaded ledger");
        Ok(Self {
            store,
            transactions,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn latest_id(&self) -> Option<TransactionId> {
        self.transactions.iter().map(|tx| tx.id).max()
    }

    /// Prepends `tx` and persists the whole ledger. Nothing changes if the
    /// write fails.
    pub fn append(&mut self, tx: Transaction) -> Result<()> {
        let mut next = Vec::with_capacity(self.transactions.len() + 1);
        next.push(tx);
        next.extend(self.transactions.iter().cloned());
        self.persist(&next)?;
        self.transactions = next;
        Ok(())
    }

    /// Removes the transaction with `id` once `confirm` agrees.
    ///
    /// `confirm` is only consulted when the transaction exists.
    pub fn delete<F>(&mut self, id: TransactionId, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(&Transaction) -> bool,
    {
        let Some(pos) = self.transactions.iter().position(|tx| tx.id == id) else {
            debug!(%id, "No transaction to delete");
            return Ok(DeleteOutcome::NotFound);
        };
        if !confirm(&self.transactions[pos]) {
            return Ok(DeleteOutcome::Declined);
        }
        let mut next = self.transactions.clone();
        next.remove(pos);
        self.persist(&next)?;
        self.transactions = next;
        info!(%id, "Deleted transaction");
        Ok(DeleteOutcome::Deleted)
    }

    pub fn filter(&self, filter: HistoryFilter) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| filter.matches(tx.from_code, tx.to_code))
            .collect()
    }

    /// Sum of every transaction's profit/loss, valued in `reference`.
    pub fn aggregate_profit_loss(&self, rates: &Rates, reference: CurrencyCode) -> f64 {
        self.transactions
            .iter()
            .map(|tx| tx.profit_loss(rates, reference))
            .sum()
    }

    fn persist(&self, transactions: &[Transaction]) -> Result<()> {
        if let Some(tx) = transactions.iter().find(|tx| !tx.is_finite()) {
            bail!("Refusing to save transaction {} with non-finite values", tx.id);
        }
        let bytes = serde_json::to_vec(transactions)?;
        self.store
            .put(LEDGER_KEY, &bytes)
            .context("Failed to save transaction history")?;
        debug!(count = transactions.len(), "Persisted ledger");
        Ok(())
    }
}
