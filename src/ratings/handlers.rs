use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::Actor;
use crate::donations;
use crate::error::ApiError;
use crate::state::AppState;

use super::gate;
use super::repo::{self, Rating};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/donations/:id/can-rate", get(can_rate))
        .route("/donations/:id/ratings", post(rate))
}

#[derive(Debug, Serialize)]
struct CanRateResponse {
    donation_id: Uuid,
    can_rate: bool,
}

#[derive(Debug, Deserialize)]
struct RateRequest {
    rating: i32,
    feedback: Option<String>,
}

#[instrument(skip(state))]
async fn can_rate(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<CanRateResponse>, ApiError> {
    let donation = donations::repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    let already = repo::has_rated(&state.db, id, actor.id).await?;
    Ok(Json(CanRateResponse {
        donation_id: id,
        can_rate: gate::can_rate(&donation, actor.id, already),
    }))
}

#[instrument(skip(state, body))]
async fn rate(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<RateRequest>,
) -> Result<(StatusCode, Json<Rating>), ApiError> {
    if !(1..=5).contains(&body.rating) {
        return Err(ApiError::BadRequest("rating must be between 1 and 5".into()));
    }

    let donation = donations::repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;

    if donation.donor_id != Some(actor.id) && donation.volunteer_id != Some(actor.id) {
        return Err(ApiError::Unauthorized("not a party to this donation"));
    }
    let rated_user = gate::rating_target(&donation, actor.id)
        .ok_or(ApiError::InvalidState("donation cannot be rated yet"))?;
    if repo::has_rated(&state.db, id, actor.id).await? {
        return Err(ApiError::InvalidState("donation already rated"));
    }

    let rating = repo::insert(
        &state.db,
        id,
        actor.id,
        rated_user,
        body.rating,
        body.feedback.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(rating)))
}
