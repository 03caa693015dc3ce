use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::Role;

use super::counters::{self, ActivityCounters};

pub async fn donation_quantities(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT quantity FROM donations WHERE donor_id = $1",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn deliveries_completed(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM donations WHERE volunteer_id = $1 AND status = 'delivered'",
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Distinct UTC calendar days with activity: donation posts for donors,
/// completed deliveries for volunteers.
pub async fn activity_days(
    db: &PgPool,
    user_id: Uuid,
    role: Role,
) -> anyhow::Result<Vec<time::Date>> {
    let sql = match role {
        Role::Donor => {
            "SELECT DISTINCT (created_at AT TIME ZONE 'UTC')::date
             FROM donations WHERE donor_id = $1"
        }
        Role::Volunteer => {
            "SELECT DISTINCT (delivered_at AT TIME ZONE 'UTC')::date
             FROM donations WHERE volunteer_id = $1 AND delivered_at IS NOT NULL"
        }
    };
    let days = sqlx::query_scalar::<_, time::Date>(sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(days)
}

/// The aggregator operation: a pure function of the donations table at the
/// time of the reads. Nothing here is cached or persisted.
pub async fn compute_counters(
    db: &PgPool,
    user_id: Uuid,
    role: Role,
) -> anyhow::Result<ActivityCounters> {
    let quantities = donation_quantities(db, user_id).await?;
    let deliveries = deliveries_completed(db, user_id).await?;
    let days = activity_days(db, user_id, role).await?;
    let today = OffsetDateTime::now_utc().date();
    let streak = counters::current_streak(today, &days);
    Ok(counters::compute(&quantities, deliveries, streak))
}
