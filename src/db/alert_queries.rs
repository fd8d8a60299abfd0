use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreatePriceAlert, PriceAlert};

pub async fn create_alert(
    pool: &PgPool,
    alert: &CreatePriceAlert,
) -> Result<PriceAlert, sqlx::Error> {
    sqlx::query_as::<_, PriceAlert>(
        r#"
        INSERT INTO price_alerts (pair, target, direction)
        VALUES ($1, $2, $3)
        RETURNING id, pair, target, direction, created_at, triggered_at
        "#,
    )
    .bind(&alert.pair)
    .bind(alert.target)
    .bind(alert.direction.as_str())
    .fetch_one(pool)
    .await
}

/// Alerts that have not fired yet; the poller's working set.
pub async fn active_alerts(pool: &PgPool) -> Result<Vec<PriceAlert>, sqlx::Error> {
    sqlx::query_as::<_, PriceAlert>(
        r#"
        SELECT id, pair, target, direction, created_at, triggered_at
        FROM price_alerts
        WHERE triggered_at IS NULL
        ORDER BY created_at
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Returns true when an active row was updated; false means the alert was
/// deleted or already triggered in the meantime.
pub async fn mark_triggered(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE price_alerts
        SET triggered_at = now()
        WHERE id = $1 AND triggered_at IS NULL
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns true when a row was deleted.
pub async fn delete_alert(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM price_alerts WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
