use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::state::AppState;

use super::counters::ActivityCounters;
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(my_stats))
}

#[instrument(skip(state))]
async fn my_stats(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ActivityCounters>, ApiError> {
    let counters = repo::compute_counters(&state.db, actor.id, actor.role).await?;
    Ok(Json(counters))
}
