//! Rate fetching abstractions and the fallback-absorbing fetch

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use tracing::{info, warn};

use super::rates::{MarketInsight, RateSnapshot, Rates, Source};

/// What a rate service returned, before it becomes a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub rates: Rates,
    pub summary: Option<String>,
    pub sources: Vec<Source>,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_quote(&self) -> Result<RateQuote>;
}

/// Fetches fresh rates and an insight. Never fails: any provider error yields
/// the fallback snapshot and an insight saying live rates are unavailable.
pub async fn fetch_latest_rates(
    provider: &(dyn RateProvider + Send + Sync),
) -> (RateSnapshot, MarketInsight) {
    match provider.fetch_quote().await {
        Ok(quote) => {
            info!(sources = quote.sources.len(), "Fetched live rates");
            let insight = MarketInsight {
                summary: quote
                    .summary
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| MarketInsight::DEFAULT_SUMMARY.to_string()),
                sources: quote.sources,
            };
            (RateSnapshot::live(quote.rates, Local::now()), insight)
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch rates, using fallback");
            (RateSnapshot::fallback(), MarketInsight::fallback())
        }
    }
}

/// Provider that never reaches the network and always fails over to the
/// fallback snapshot.
pub struct OfflineProvider;

#[async_trait]
impl RateProvider for OfflineProvider {
    async fn fetch_quote(&self) -> Result<RateQuote> {
        anyhow::bail!("Offline mode, live rates not requested")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        result: std::result::Result<RateQuote, String>,
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn new(result: std::result::Result<RateQuote, String>) -> Self {
            Self {
                result,
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn fetch_quote(&self) -> Result<RateQuote> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(|e| anyhow!(e))
        }
    }

    fn live_rates() -> Rates {
        Rates::new([1.0, 31.9, 7.2, 25_500.0, 7.79, 149.5, 0.91, 0.77]).unwrap()
    }

    #[tokio::test]
    async fn test_success_produces_live_snapshot() {
        let provider = MockProvider::new(Ok(RateQuote {
            rates: live_rates(),
            summary: Some("台幣小幅走強。".to_string()),
            sources: vec![Source {
                title: "Reuters".to_string(),
                uri: "https://example.com/fx".to_string(),
            }],
        }));

        let (snapshot, insight) = fetch_latest_rates(&provider).await;

        assert_eq!(provider.call_count.load(Ordering::SeqCst), 1);
        assert!(snapshot.freshness.is_live());
        assert_eq!(snapshot.rates.get(CurrencyCode::Twd), 31.9);
        assert_eq!(insight.summary, "台幣小幅走強。");
        assert_eq!(insight.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_summary_gets_default() {
        let provider = MockProvider::new(Ok(RateQuote {
            rates: live_rates(),
            summary: None,
            sources: vec![],
        }));

        let (_, insight) = fetch_latest_rates(&provider).await;
        assert_eq!(insight.summary, MarketInsight::DEFAULT_SUMMARY);
        assert!(insight.sources.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_absorbed_into_fallback() {
        let provider = MockProvider::new(Err("connection refused".to_string()));

        let (snapshot, insight) = fetch_latest_rates(&provider).await;

        assert_eq!(snapshot, RateSnapshot::fallback());
        for code in CurrencyCode::ALL {
            assert!(snapshot.rates.get(code) > 0.0);
        }
        assert!(!snapshot.freshness.is_live());
        assert_eq!(insight, MarketInsight::fallback());
    }

    #[tokio::test]
    async fn test_offline_provider_uses_fallback() {
        let (snapshot, insight) = fetch_latest_rates(&OfflineProvider).await;
        assert_eq!(snapshot, RateSnapshot::fallback());
        assert_eq!(insight.summary, MarketInsight::FALLBACK_SUMMARY);
    }
}
