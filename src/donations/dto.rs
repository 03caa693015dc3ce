use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::{Donation, DonationProof};

#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    pub title: String,
    pub description: Option<String>,
    pub food_type: String,
    pub quantity: String,
    #[serde(default = "default_urgency")]
    pub urgency: String,
    pub pickup_address: String,
    pub pickup_city: String,
    /// YYYY-MM-DD
    pub expiry_date: String,
    pub pickup_time: Option<String>,
    /// Anonymous donations carry no donor and cannot be deleted later.
    #[serde(default)]
    pub anonymous: bool,
}

fn default_urgency() -> String {
    "normal".into()
}

#[derive(Debug, Deserialize)]
pub struct ListDonationsQuery {
    pub city: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

const MAX_LIMIT: i64 = 100;

impl ListDonationsQuery {
    /// Sanitized (limit, offset): a negative value would reach Postgres and
    /// fail the whole query, so clamp instead of erroring.
    pub fn page(&self) -> (i64, i64) {
        (self.limit.clamp(0, MAX_LIMIT), self.offset.max(0))
    }
}

#[derive(Debug, Deserialize)]
pub struct AttachProofRequest {
    /// Reference returned by the external upload service.
    pub url: String,
    /// before | after
    pub proof_type: String,
}

#[derive(Debug, Serialize)]
pub struct CounterpartResponse {
    pub donation_id: Uuid,
    pub counterpart_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DonationDetails {
    #[serde(flatten)]
    pub donation: Donation,
    pub proofs: Vec<DonationProof>,
}
