use std::collections::HashMap;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::auth::Actor;
use crate::stats;

use super::dto::AchievementStatus;
use super::engine::{self, Category, Tier};
use super::repo::{self, UnlockRow};

/// Recomputes eligibility for every catalog entry applicable to the actor's
/// role. Newly met thresholds are recorded via a conditional insert, so two
/// concurrent evaluations of the same user can never double-award: the loser
/// of the race re-reads the stored unlock and reports it.
pub async fn evaluate_user(db: &PgPool, actor: Actor) -> anyhow::Result<Vec<AchievementStatus>> {
    let counters = stats::repo::compute_counters(db, actor.id, actor.role).await?;
    let catalog = repo::load_catalog(db).await?;
    let unlocks: HashMap<Uuid, UnlockRow> = repo::unlocks_for(db, actor.id)
        .await?
        .into_iter()
        .map(|u| (u.achievement_id, u))
        .collect();

    let mut out = Vec::with_capacity(catalog.len());
    for def in catalog {
        if !engine::applies_to(&def.role, actor.role) {
            continue;
        }
        let (Some(category), Some(tier)) =
            (Category::parse(&def.category), Tier::parse(&def.tier))
        else {
            warn!(code = %def.code, "skipping malformed achievement definition");
            continue;
        };

        let existing = unlocks.get(&def.id).map(|u| u.unlocked_at);
        let mut eval = engine::evaluate(category, def.points_required, &counters, existing);

        if eval.unlocked && existing.is_none() {
            eval.unlocked_at = match repo::record_unlock(db, actor.id, def.id).await? {
                Some(row) => Some(row.unlocked_at),
                // lost the insert race; the stored row is authoritative
                None => repo::unlock_for(db, actor.id, def.id)
                    .await?
                    .map(|row| row.unlocked_at),
            };
        }

        out.push(AchievementStatus {
            code: def.code,
            name: def.name,
            tier,
            category,
            unlocked: eval.unlocked,
            unlocked_at: eval.unlocked_at,
            progress: eval.progress,
            current_value: eval.current_value,
            target_value: eval.target_value,
        });
    }
    Ok(out)
}
