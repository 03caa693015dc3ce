use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

use super::lifecycle::DonationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Option<Uuid>,
    pub volunteer_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub food_type: String,
    pub quantity: String,
    pub urgency: String,
    pub status: String,
    pub pickup_address: String,
    pub pickup_city: String,
    pub expiry_date: String,
    pub pickup_time: Option<String>,
    pub created_at: OffsetDateTime,
    pub picked_up_at: Option<OffsetDateTime>,
    pub delivered_at: Option<OffsetDateTime>,
}

impl Donation {
    pub fn status(&self) -> Result<DonationStatus, ApiError> {
        DonationStatus::parse(&self.status).ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("unknown donation status {:?}", self.status))
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DonationProof {
    pub donation_id: Uuid,
    pub proof_type: String,
    pub url: String,
    pub created_at: OffsetDateTime,
}

pub struct NewDonation {
    pub donor_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub food_type: String,
    pub quantity: String,
    pub urgency: String,
    pub pickup_address: String,
    pub pickup_city: String,
    pub expiry_date: String,
    pub pickup_time: Option<String>,
}

const DONATION_COLUMNS: &str = "id, donor_id, volunteer_id, title, description, food_type, \
     quantity, urgency, status, pickup_address, pickup_city, expiry_date, pickup_time, \
     created_at, picked_up_at, delivered_at";

pub async fn create(db: &PgPool, new: NewDonation) -> anyhow::Result<Donation> {
    let sql = format!(
        r#"
        INSERT INTO donations
            (id, donor_id, title, description, food_type, quantity, urgency,
             pickup_address, pickup_city, expiry_date, pickup_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {DONATION_COLUMNS}
        "#
    );
    let donation = sqlx::query_as::<_, Donation>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.donor_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.food_type)
        .bind(&new.quantity)
        .bind(&new.urgency)
        .bind(&new.pickup_address)
        .bind(&new.pickup_city)
        .bind(&new.expiry_date)
        .bind(&new.pickup_time)
        .fetch_one(db)
        .await?;
    Ok(donation)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Donation>> {
    let sql = format!("SELECT {DONATION_COLUMNS} FROM donations WHERE id = $1");
    let donation = sqlx::query_as::<_, Donation>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(donation)
}

pub async fn list_pending(
    db: &PgPool,
    city: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Donation>> {
    let sql = format!(
        r#"
        SELECT {DONATION_COLUMNS}
        FROM donations
        WHERE status = 'pending' AND ($1::text IS NULL OR pickup_city = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, Donation>(&sql)
        .bind(city)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Donation>> {
    let sql = format!(
        r#"
        SELECT {DONATION_COLUMNS}
        FROM donations
        WHERE donor_id = $1 OR volunteer_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, Donation>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Compare-and-set: assigns the volunteer only if the row is still pending.
/// `None` means the guard no longer holds (another volunteer won the race).
pub async fn accept(db: &PgPool, id: Uuid, volunteer_id: Uuid) -> anyhow::Result<Option<Donation>> {
    let sql = format!(
        r#"
        UPDATE donations
        SET status = 'accepted', volunteer_id = $2
        WHERE id = $1 AND status = 'pending'
        RETURNING {DONATION_COLUMNS}
        "#
    );
    let donation = sqlx::query_as::<_, Donation>(&sql)
        .bind(id)
        .bind(volunteer_id)
        .fetch_optional(db)
        .await?;
    Ok(donation)
}

/// Pickup timestamp comes from the database clock at commit time, never from
/// the client.
pub async fn mark_picked_up(
    db: &PgPool,
    id: Uuid,
    volunteer_id: Uuid,
) -> anyhow::Result<Option<Donation>> {
    let sql = format!(
        r#"
        UPDATE donations
        SET status = 'in_transit', picked_up_at = now()
        WHERE id = $1 AND status = 'accepted' AND volunteer_id = $2
        RETURNING {DONATION_COLUMNS}
        "#
    );
    let donation = sqlx::query_as::<_, Donation>(&sql)
        .bind(id)
        .bind(volunteer_id)
        .fetch_optional(db)
        .await?;
    Ok(donation)
}

pub async fn mark_delivered(
    db: &PgPool,
    id: Uuid,
    volunteer_id: Uuid,
) -> anyhow::Result<Option<Donation>> {
    let sql = format!(
        r#"
        UPDATE donations
        SET status = 'delivered', delivered_at = now()
        WHERE id = $1 AND status = 'in_transit' AND volunteer_id = $2
        RETURNING {DONATION_COLUMNS}
        "#
    );
    let donation = sqlx::query_as::<_, Donation>(&sql)
        .bind(id)
        .bind(volunteer_id)
        .fetch_optional(db)
        .await?;
    Ok(donation)
}

/// Conditional delete mirroring `authorize_delete`; returns whether a row was
/// actually removed.
pub async fn delete_pending(db: &PgPool, id: Uuid, donor_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "DELETE FROM donations WHERE id = $1 AND status = 'pending' AND donor_id = $2",
    )
    .bind(id)
    .bind(donor_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn upsert_proof(
    db: &PgPool,
    donation_id: Uuid,
    proof_type: &str,
    url: &str,
) -> anyhow::Result<DonationProof> {
    let proof = sqlx::query_as::<_, DonationProof>(
        r#"
        INSERT INTO donation_proofs (donation_id, proof_type, url)
        VALUES ($1, $2, $3)
        ON CONFLICT (donation_id, proof_type) DO UPDATE SET url = EXCLUDED.url
        RETURNING donation_id, proof_type, url, created_at
        "#,
    )
    .bind(donation_id)
    .bind(proof_type)
    .bind(url)
    .fetch_one(db)
    .await?;
    Ok(proof)
}

pub async fn list_proofs(db: &PgPool, donation_id: Uuid) -> anyhow::Result<Vec<DonationProof>> {
    let rows = sqlx::query_as::<_, DonationProof>(
        r#"
        SELECT donation_id, proof_type, url, created_at
        FROM donation_proofs
        WHERE donation_id = $1
        ORDER BY proof_type
        "#,
    )
    .bind(donation_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
