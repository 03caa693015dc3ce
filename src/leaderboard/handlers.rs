use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::state::AppState;

use super::rank::{self, LeaderboardEntry};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard))
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    /// donor | volunteer
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "default_n")]
    n: i64,
}

fn default_n() -> i64 {
    3
}

#[instrument(skip(state))]
async fn leaderboard(
    State(state): State<AppState>,
    _actor: Actor,
    Query(q): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let counts = match q.kind.as_str() {
        "donor" => repo::donor_counts(&state.db).await?,
        "volunteer" => repo::volunteer_counts(&state.db).await?,
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown leaderboard type {other:?}"
            )))
        }
    };
    let n = q.n.max(0) as usize;
    Ok(Json(rank::rank(counts, n)))
}
