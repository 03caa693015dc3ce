use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::state::AppState;

use super::repo::{self, REFEREE_BONUS, REFERRER_BONUS};

pub fn routes() -> Router<AppState> {
    Router::new().route("/referrals", post(complete_referral))
}

#[derive(Debug, Deserialize)]
struct CompleteReferralRequest {
    referee_id: Uuid,
}

#[derive(Debug, Serialize)]
struct ReferralResponse {
    referrer_id: Uuid,
    referee_id: Uuid,
    referrer_bonus: i64,
    referee_bonus: i64,
    referrer_points: i64,
}

#[instrument(skip(state))]
async fn complete_referral(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CompleteReferralRequest>,
) -> Result<(StatusCode, Json<ReferralResponse>), ApiError> {
    if body.referee_id == actor.id {
        return Err(ApiError::BadRequest("cannot refer yourself".into()));
    }

    repo::complete(&state.db, actor.id, body.referee_id).await?;
    let referrer_points = repo::points_balance(&state.db, actor.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReferralResponse {
            referrer_id: actor.id,
            referee_id: body.referee_id,
            referrer_bonus: REFERRER_BONUS,
            referee_bonus: REFEREE_BONUS,
            referrer_points,
        }),
    ))
}
