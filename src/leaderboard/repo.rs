use sqlx::PgPool;
use uuid::Uuid;

/// Per-donor donation counts, any status. Ordering happens in `rank`, not
/// here.
pub async fn donor_counts(db: &PgPool) -> anyhow::Result<Vec<(Uuid, Option<String>, i64)>> {
    let rows = sqlx::query_as::<_, (Uuid, Option<String>, i64)>(
        r#"
        SELECT d.donor_id, p.display_name, COUNT(*)
        FROM donations d
        LEFT JOIN profiles p ON p.id = d.donor_id
        WHERE d.donor_id IS NOT NULL
        GROUP BY d.donor_id, p.display_name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Per-volunteer completed-delivery counts.
pub async fn volunteer_counts(db: &PgPool) -> anyhow::Result<Vec<(Uuid, Option<String>, i64)>> {
    let rows = sqlx::query_as::<_, (Uuid, Option<String>, i64)>(
        r#"
        SELECT d.volunteer_id, p.display_name, COUNT(*)
        FROM donations d
        LEFT JOIN profiles p ON p.id = d.volunteer_id
        WHERE d.volunteer_id IS NOT NULL AND d.status = 'delivered'
        GROUP BY d.volunteer_id, p.display_name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}
