use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One catalog entry. The catalog is seeded by migration and immutable at
/// runtime.
#[derive(Debug, Clone, FromRow)]
pub struct AchievementDef {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub tier: String,
    pub category: String,
    pub points_required: i64,
    pub role: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UnlockRow {
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub unlocked_at: OffsetDateTime,
}

pub async fn load_catalog(db: &PgPool) -> anyhow::Result<Vec<AchievementDef>> {
    let defs = sqlx::query_as::<_, AchievementDef>(
        r#"
        SELECT id, code, name, tier, category, points_required, role
        FROM achievements
        ORDER BY points_required, code
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(defs)
}

pub async fn unlocks_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<UnlockRow>> {
    let rows = sqlx::query_as::<_, UnlockRow>(
        r#"
        SELECT user_id, achievement_id, unlocked_at
        FROM user_achievements
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn unlock_for(
    db: &PgPool,
    user_id: Uuid,
    achievement_id: Uuid,
) -> anyhow::Result<Option<UnlockRow>> {
    let row = sqlx::query_as::<_, UnlockRow>(
        r#"
        SELECT user_id, achievement_id, unlocked_at
        FROM user_achievements
        WHERE user_id = $1 AND achievement_id = $2
        "#,
    )
    .bind(user_id)
    .bind(achievement_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// At-most-once unlock: the primary key on (user_id, achievement_id) makes a
/// concurrent duplicate a silent no-op, never an error. `None` means another
/// evaluation won the race; the caller re-reads the stored row.
pub async fn record_unlock(
    db: &PgPool,
    user_id: Uuid,
    achievement_id: Uuid,
) -> anyhow::Result<Option<UnlockRow>> {
    let row = sqlx::query_as::<_, UnlockRow>(
        r#"
        INSERT INTO user_achievements (user_id, achievement_id, progress, unlocked_at)
        VALUES ($1, $2, 100, now())
        ON CONFLICT (user_id, achievement_id) DO NOTHING
        RETURNING user_id, achievement_id, unlocked_at
        "#,
    )
    .bind(user_id)
    .bind(achievement_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
