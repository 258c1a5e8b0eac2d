use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::GeminiProviderConfig;
use crate::core::currency::CurrencyCode;
use crate::core::fetcher::{RateProvider, RateQuote};
use crate::core::rates::{Rates, Source};

const DEFAULT_SOURCE_TITLE: &str = "Market Source";

/// Asks a Gemini model, grounded on web search, for current USD rates and a
/// one-sentence market comment.
pub struct GeminiProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout: Duration) -> Self {
        GeminiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            timeout,
        }
    }

    pub fn from_config(config: &GeminiProviderConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.model,
            config.resolve_api_key(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

pub fn rates_prompt() -> String {
    let targets: Vec<&str> = CurrencyCode::ALL
        .iter()
        .filter(|c| **c != CurrencyCode::Usd)
        .map(|c| c.as_str())
        .collect();
    let fields: Vec<String> = CurrencyCode::ALL
        .iter()
        .map(|c| match c {
            CurrencyCode::Usd => "    \"USD\": 1".to_string(),
            other => format!("    \"{other}\": number"),
        })
        .collect();

    format!(
        "Find the latest real-time exchange rates for 1 USD to {}.\n\
         Return only a JSON object matching this structure:\n\
         {{\n  \"rates\": {{\n{}\n  }},\n  \
         \"summary\": \"Short 1-sentence market trend comment in Traditional Chinese\"\n}}",
        targets.join(", "),
        fields.join(",\n")
    )
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Debug)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize, Debug)]
struct WebChunk {
    title: Option<String>,
    uri: Option<String>,
}

/// The JSON document the model is asked to produce.
#[derive(Deserialize, Debug)]
struct RatePayload {
    rates: HashMap<String, Value>,
    summary: Option<String>,
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_payload(text: &str) -> Result<(Rates, Option<String>)> {
    let payload: RatePayload = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| anyhow!("Failed to parse rate payload: {}", e))?;

    let numeric: HashMap<String, f64> = payload
        .rates
        .into_iter()
        .filter_map(|(code, value)| value.as_f64().map(|v| (code, v)))
        .collect();
    let rates = Rates::from_map(&numeric)?;
    Ok((rates, payload.summary))
}

fn extract_sources(candidate: &Candidate) -> Vec<Source> {
    candidate
        .grounding_metadata
        .as_ref()
        .map(|meta| {
            meta.grounding_chunks
                .iter()
                .map(|chunk| {
                    let web = chunk.web.as_ref();
                    Source {
                        title: web
                            .and_then(|w| w.title.clone())
                            .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string()),
                        uri: web.and_then(|w| w.uri.clone()).unwrap_or_default(),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl RateProvider for GeminiProvider {
    #[instrument(
        name = "GeminiRateFetch",
        skip(self),
        fields(model = %self.model)
    )]
    async fn fetch_quote(&self) -> Result<RateQuote> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing Gemini API key, set GEMINI_API_KEY"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!("Requesting rates from {}", url);

        let body = json!({
            "contents": [{ "parts": [{ "text": rates_prompt() }] }],
            "tools": [{ "google_search": {} }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let client = reqwest::Client::builder()
            .user_agent("quickswap/1.0")
            .timeout(self.timeout)
            .build()?;
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for model: {}", e, self.model))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for model: {}",
                response.status(),
                self.model
            ));
        }

        let text = response.text().await?;
        let data: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", self.model, e))?;

        let candidate = data
            .candidates
            .first()
            .ok_or_else(|| anyhow!("No candidates in response for model: {}", self.model))?;

        let answer: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();
        if answer.trim().is_empty() {
            return Err(anyhow!("Empty answer from model: {}", self.model));
        }

        let (rates, summary) = parse_payload(&answer)?;
        let sources = extract_sources(candidate);
        debug!(?rates, sources = sources.len(), "Parsed rate quote");

        Ok(RateQuote {
            rates,
            summary,
            sources,
        })
    }
}
