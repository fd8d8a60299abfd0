use sqlx::PgPool;

use crate::models::{AnalysisRecord, InstrumentClass};

pub async fn insert_analysis(
    pool: &PgPool,
    horizon: InstrumentClass,
    analysis: &serde_json::Value,
) -> Result<AnalysisRecord, sqlx::Error> {
    sqlx::query_as::<_, AnalysisRecord>(
        r#"
        INSERT INTO analysis_history (horizon, analysis)
        VALUES ($1, $2)
        RETURNING id, horizon, analysis, created_at
        "#,
    )
    .bind(horizon.as_str())
    .bind(analysis)
    .fetch_one(pool)
    .await
}

/// The most recent analyses for a horizon, newest first.
pub async fn recent_analyses(
    pool: &PgPool,
    horizon: InstrumentClass,
    limit: i64,
) -> Result<Vec<AnalysisRecord>, sqlx::Error> {
    sqlx::query_as::<_, AnalysisRecord>(
        r#"
        SELECT id, horizon, analysis, created_at
        FROM analysis_history
        WHERE horizon = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(horizon.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await
}
