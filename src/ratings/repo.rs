use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rating {
    pub donation_id: Uuid,
    pub rated_by: Uuid,
    pub rated_user: Uuid,
    pub rating: i32,
    pub feedback: Option<String>,
    pub created_at: OffsetDateTime,
}

pub async fn has_rated(db: &PgPool, donation_id: Uuid, rated_by: Uuid) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM ratings WHERE donation_id = $1 AND rated_by = $2)",
    )
    .bind(donation_id)
    .bind(rated_by)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Guarded by the unique key on (donation_id, rated_by): a racing duplicate
/// loses the conditional insert and surfaces as `Conflict`.
pub async fn insert(
    db: &PgPool,
    donation_id: Uuid,
    rated_by: Uuid,
    rated_user: Uuid,
    rating: i32,
    feedback: Option<&str>,
) -> Result<Rating, ApiError> {
    let row = sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (donation_id, rated_by, rated_user, rating, feedback)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (donation_id, rated_by) DO NOTHING
        RETURNING donation_id, rated_by, rated_user, rating, feedback, created_at
        "#,
    )
    .bind(donation_id)
    .bind(rated_by)
    .bind(rated_user)
    .bind(rating)
    .bind(feedback)
    .fetch_optional(db)
    .await?;
    row.ok_or(ApiError::Conflict)
}
