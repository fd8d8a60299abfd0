use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::external::chart_analyzer::{AnalysisError, ChartAnalyzer};
use crate::models::{ChartAnalysis, InstrumentClass, Timeframe};
use crate::services::prompt;

const GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the Gemini `generateContent` endpoint. One synchronous
/// request-response call per analysis with a fixed timeout; no retries,
/// no caching.
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// A missing key is a configuration problem, not an analysis failure,
    /// so it is reported outside the `AnalysisError` taxonomy.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| "GEMINI_API_KEY not set")?;
        Ok(Self::new(api_key)?)
    }

    fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        )
    }

    fn build_request(
        image: &[u8],
        mime_type: &str,
        timeframe: Timeframe,
        class: InstrumentClass,
    ) -> GenerateRequest {
        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: prompt::build_analysis_prompt(timeframe, class),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: BASE64.encode(image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        }
    }

    /// Map an upstream status and body to the analysis result. Split out of
    /// the transport call so the envelope and contract handling is testable
    /// without a network.
    fn parse_reply(status: u16, body: String) -> Result<serde_json::Value, AnalysisError> {
        if status != 200 {
            return Err(AnalysisError::Upstream { status, body });
        }

        let envelope: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::Contract(format!("malformed response envelope: {}", e)))?;

        let text = envelope
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|p| p.text)
            .ok_or_else(|| {
                AnalysisError::Contract("no generated text in response".to_string())
            })?;

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            AnalysisError::Contract(format!("generated text is not valid JSON: {}", e))
        })?;

        // The prompt tells the model to short-circuit with an error object
        // when the chart's visible timeframe disagrees with the request.
        if let Some(reason) = value.get("error").and_then(|v| v.as_str()) {
            return Err(AnalysisError::Contract(format!(
                "model rejected the chart: {}",
                reason
            )));
        }

        serde_json::from_value::<ChartAnalysis>(value.clone()).map_err(|e| {
            AnalysisError::Contract(format!("analysis does not match the expected schema: {}", e))
        })?;

        Ok(value)
    }
}

#[async_trait]
impl ChartAnalyzer for GeminiClient {
    async fn analyze_chart(
        &self,
        image: &[u8],
        mime_type: &str,
        timeframe: Timeframe,
        class: InstrumentClass,
    ) -> Result<serde_json::Value, AnalysisError> {
        info!(
            "requesting {} chart analysis from Gemini (timeframe: {}, image: {} bytes, {})",
            class,
            timeframe,
            image.len(),
            mime_type
        );

        let request = Self::build_request(image, mime_type, timeframe, class);

        let response = self
            .client
            .post(self.request_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        if status != 200 {
            error!("Gemini API error (HTTP {}): {}", status, body);
        }

        Self::parse_reply(status, body)
    }
}

// Wire format of the generateContent call, mirroring the REST payload.

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<GenerateCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GenerateCandidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
