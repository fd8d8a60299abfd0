use axum::extract::{Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::analysis_queries;
use crate::errors::AppError;
use crate::models::{AnalysisRecord, InstrumentClass, Timeframe};
use crate::services::chart_gate;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scalp/chart", post(analyze_scalp_chart))
        .route("/scalp/history", get(scalp_history))
        .route("/swing/chart", post(analyze_swing_chart))
        .route("/swing/history", get(swing_history))
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    timeframe: Timeframe,
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<i64>,
}

/// POST /scalp/chart?timeframe=M1|M5|M15|M30|H1
async fn analyze_scalp_chart(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    analyze_chart(state, InstrumentClass::Scalp, params.timeframe, multipart).await
}

/// POST /swing/chart?timeframe=H1|D1|W1
async fn analyze_swing_chart(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    analyze_chart(state, InstrumentClass::Swing, params.timeframe, multipart).await
}

/// Shared pipeline for both analysis variants: extract the upload, gate it
/// through the chart heuristic, forward to the AI, persist, return. The
/// gate runs before any upstream call so rejected images cost nothing.
async fn analyze_chart(
    state: AppState,
    class: InstrumentClass,
    timeframe: Timeframe,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    info!("POST /{}/chart - timeframe: {}", class, timeframe);

    if !class.allows(timeframe) {
        return Err(AppError::Validation(format!(
            "timeframe {} is not valid for {} analysis",
            timeframe, class
        )));
    }

    let (bytes, mime_type) = extract_upload(multipart).await?;

    if !chart_gate::looks_like_chart(&bytes) {
        return Err(AppError::Validation(
            "Please upload a valid trading chart image.".to_string(),
        ));
    }

    let analysis = state
        .analyzer
        .analyze_chart(&bytes, &mime_type, timeframe, class)
        .await?;

    // History is best-effort; a persistence failure must not swallow an
    // analysis the caller already paid for.
    if let Err(e) = analysis_queries::insert_analysis(&state.pool, class, &analysis).await {
        warn!("failed to persist {} analysis: {}", class, e);
    }

    Ok(Json(analysis))
}

/// GET /scalp/history?limit=
async fn scalp_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<AnalysisRecord>>, AppError> {
    history(state, InstrumentClass::Scalp, params).await
}

/// GET /swing/history?limit=
async fn swing_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<AnalysisRecord>>, AppError> {
    history(state, InstrumentClass::Swing, params).await
}

async fn history(
    state: AppState,
    class: InstrumentClass,
    params: HistoryParams,
) -> Result<Json<Vec<AnalysisRecord>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let records = analysis_queries::recent_analyses(&state.pool, class, limit).await?;
    Ok(Json(records))
}

/// Pull the first `file` field out of the multipart body, along with its
/// media type. The declared content type wins; otherwise the filename
/// extension is consulted; otherwise PNG is assumed.
async fn extract_upload(mut multipart: Multipart) -> Result<(Vec<u8>, String), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let mime_type = guess_mime_type(
            field.content_type().map(str::to_string),
            field.file_name().map(str::to_string),
        );
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {}", e)))?
            .to_vec();

        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }

        return Ok((bytes, mime_type));
    }

    Err(AppError::Validation(
        "missing multipart field 'file'".to_string(),
    ))
}

fn guess_mime_type(content_type: Option<String>, file_name: Option<String>) -> String {
    if let Some(declared) = content_type {
        if declared.starts_with("image/") {
            return declared;
        }
    }

    let extension = file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
        Some("gif") => "image/gif".to_string(),
        Some("webp") => "image/webp".to_string(),
        Some("bmp") => "image/bmp".to_string(),
        _ => "image/png".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_image_content_type_wins() {
        assert_eq!(
            guess_mime_type(Some("image/webp".into()), Some("chart.png".into())),
            "image/webp"
        );
    }

    #[test]
    fn extension_is_used_when_content_type_is_not_an_image() {
        assert_eq!(
            guess_mime_type(
                Some("application/octet-stream".into()),
                Some("chart.JPEG".into())
            ),
            "image/jpeg"
        );
    }

    #[test]
    fn png_is_the_fallback() {
        assert_eq!(guess_mime_type(None, Some("chart".into())), "image/png");
        assert_eq!(guess_mime_type(None, None), "image/png");
    }
}
