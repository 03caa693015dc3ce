use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::AchievementStatus;
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new().route("/achievements", get(my_achievements))
}

#[instrument(skip(state))]
async fn my_achievements(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<AchievementStatus>>, ApiError> {
    let statuses = services::evaluate_user(&state.db, actor).await?;
    Ok(Json(statuses))
}
