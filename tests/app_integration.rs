use quickswap::core::{CurrencyCode, HistoryFilter, Ledger, Offer};
use quickswap::{AppCommand, run_command};
use std::fs;
use std::path::Path;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const MODEL: &str = "gemini-test";

    pub fn gemini_envelope(answer: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": answer }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "title": "FX desk", "uri": "https://example.com/fx" } }
                    ]
                }
            }]
        })
        .to_string()
    }

    pub async fn create_gemini_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v1beta/models/{MODEL}:generateContent");

        Mock::given(method("POST"))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

const LIVE_RATES: &str = r#"{"rates":{"USD":1,"TWD":32.5,"CNY":7.24,"VND":25400,"HKD":7.8,"JPY":155,"EUR":0.92,"GBP":0.78},"summary":"越南盾走弱。"}"#;

fn write_config(dir: &Path, base_url: &str) -> String {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
        providers:
          gemini:
            base_url: {}
            model: {}
            api_key: "test-key"
            timeout_secs: 5
        reference_currency: "TWD"
        data_path: {}
    "#,
        base_url,
        test_utils::MODEL,
        dir.join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_str().unwrap().to_string()
}

fn load_ledger(dir: &Path) -> Ledger {
    let store = quickswap::store::open(&dir.join("data")).expect("Failed to open store");
    Ledger::load(store).expect("Failed to load ledger")
}

fn twd_to_vnd(to_amount: f64) -> Offer {
    Offer {
        from: CurrencyCode::Twd,
        to: CurrencyCode::Vnd,
        from_amount: 1000.0,
        to_amount,
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_gemini_mock_server(
        200,
        &test_utils::gemini_envelope(LIVE_RATES),
    )
    .await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let result = run_command(
        AppCommand::Rates {
            edit: Some((CurrencyCode::Twd, 1000.0)),
            show: Some((0, CurrencyCode::Gbp)),
            all: false,
        },
        Some(&config_path),
        false,
    )
    .await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());

    for to_amount in [780_000.0, 790_000.0] {
        let result = run_command(
            AppCommand::Compare {
                offer: twd_to_vnd(to_amount),
                save: true,
            },
            Some(&config_path),
            false,
        )
        .await;
        assert!(result.is_ok(), "Compare failed with: {:?}", result.err());
    }

    let ledger = load_ledger(temp_dir.path());
    info!(count = ledger.len(), "Ledger after saving offers");
    assert_eq!(ledger.len(), 2);
    // Most recent first
    assert_eq!(ledger.transactions()[0].to_amount, 790_000.0);
    assert!(ledger.transactions()[0].diff_percent > 0.0);
    assert!(ledger.transactions()[1].diff_percent < 0.0);
    assert!(ledger.transactions()[0].id > ledger.transactions()[1].id);
    drop(ledger);

    let result = run_command(
        AppCommand::History {
            filter: HistoryFilter::Code(CurrencyCode::Vnd),
            reference: None,
        },
        Some(&config_path),
        false,
    )
    .await;
    assert!(result.is_ok(), "History failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_delete_flow() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "http://127.0.0.1:9");

    let result = run_command(
        AppCommand::Compare {
            offer: twd_to_vnd(780_000.0),
            save: true,
        },
        Some(&config_path),
        true,
    )
    .await;
    assert!(result.is_ok(), "Compare failed with: {:?}", result.err());

    let ledger = load_ledger(temp_dir.path());
    let id = ledger.transactions()[0].id;
    drop(ledger);

    let result = run_command(
        AppCommand::Delete {
            id,
            assume_yes: true,
        },
        Some(&config_path),
        false,
    )
    .await;
    assert!(result.is_ok(), "Delete failed with: {:?}", result.err());

    assert!(load_ledger(temp_dir.path()).is_empty());
}

#[test_log::test(tokio::test)]
async fn test_service_failure_falls_back() {
    let mock_server = test_utils::create_gemini_mock_server(503, "unavailable").await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &mock_server.uri());

    let result = run_command(
        AppCommand::Compare {
            offer: twd_to_vnd(780_000.0),
            save: true,
        },
        Some(&config_path),
        false,
    )
    .await;
    assert!(result.is_ok(), "Compare failed with: {:?}", result.err());

    // Recorded against the fallback rates
    let ledger = load_ledger(temp_dir.path());
    let tx = &ledger.transactions()[0];
    assert!((tx.market_rate - 25400.0 / 32.5).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_blocked_comparison_is_an_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "http://127.0.0.1:9");

    let result = run_command(
        AppCommand::Compare {
            offer: Offer {
                from_amount: 0.0,
                ..twd_to_vnd(780_000.0)
            },
            save: true,
        },
        Some(&config_path),
        true,
    )
    .await;
    assert!(result.is_err());
    assert!(load_ledger(temp_dir.path()).is_empty());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let result = run_command(
        AppCommand::History {
            filter: HistoryFilter::All,
            reference: None,
        },
        Some("/nonexistent/quickswap/config.yaml"),
        true,
    )
    .await;
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}
