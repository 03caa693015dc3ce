use serde::Serialize;
use time::OffsetDateTime;

use super::engine::{Category, Tier};

#[derive(Debug, Serialize)]
pub struct AchievementStatus {
    pub code: String,
    pub name: String,
    pub tier: Tier,
    pub category: Category,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<OffsetDateTime>,
    pub progress: i64,
    pub current_value: i64,
    pub target_value: i64,
}
