use async_trait::async_trait;
use thiserror::Error;

use crate::models::{InstrumentClass, Timeframe};

/// Failure modes of the analysis requestor. Transport problems and upstream
/// rejections are kept apart from contract violations: the former point at
/// infrastructure, the latter mean the model broke its output schema.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("AI API request failed: {0}")]
    Network(String),

    #[error("AI API error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("AI reply violated the output contract: {0}")]
    Contract(String),
}

/// Seam between the HTTP handlers and the remote vision model.
#[async_trait]
pub trait ChartAnalyzer: Send + Sync {
    /// Analyze validated chart bytes for the given timeframe and variant,
    /// returning the schema-conforming analysis JSON.
    async fn analyze_chart(
        &self,
        image: &[u8],
        mime_type: &str,
        timeframe: Timeframe,
        class: InstrumentClass,
    ) -> Result<serde_json::Value, AnalysisError>;
}
