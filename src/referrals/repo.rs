use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiError;

pub const REFERRER_BONUS: i64 = 50;
pub const REFEREE_BONUS: i64 = 25;

/// Completes a referral atomically: the referral row and both point credits
/// commit together, or not at all. A user can be referred at most once, ever;
/// the primary key on referee_id makes the second attempt `AlreadyReferred`
/// with no partial credit.
pub async fn complete(db: &PgPool, referrer_id: Uuid, referee_id: Uuid) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO referrals (referee_id, referrer_id)
        VALUES ($1, $2)
        ON CONFLICT (referee_id) DO NOTHING
        "#,
    )
    .bind(referee_id)
    .bind(referrer_id)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        // tx dropped here, nothing committed
        return Err(ApiError::AlreadyReferred);
    }

    credit_points(&mut tx, referrer_id, REFERRER_BONUS).await?;
    credit_points(&mut tx, referee_id, REFEREE_BONUS).await?;

    tx.commit().await?;
    Ok(())
}

/// Upsert so a credit lands even before the profile row exists.
async fn credit_points(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    delta: i64,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, points)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET points = profiles.points + EXCLUDED.points
        "#,
    )
    .bind(user_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn points_balance(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let points = sqlx::query_scalar::<_, i64>("SELECT points FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .unwrap_or(0);
    Ok(points)
}
