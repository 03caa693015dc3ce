use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::macros::format_description;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::notify::{self, EventKind, NotificationEvent};
use crate::state::AppState;

use super::dto::{
    AttachProofRequest, CounterpartResponse, CreateDonationRequest, DonationDetails,
    ListDonationsQuery,
};
use super::lifecycle::{self, DonationStatus};
use super::repo::{self, Donation, DonationProof, NewDonation};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/donations", get(list_donations))
        .route("/donations/mine", get(list_my_donations))
        .route("/donations/:id", get(get_donation))
        .route("/donations/:id/counterpart", get(get_counterpart))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/donations", post(create_donation))
        .route("/donations/:id", delete(delete_donation))
        .route("/donations/:id/accept", post(accept_donation))
        .route("/donations/:id/pickup", post(pickup_donation))
        .route("/donations/:id/deliver", post(deliver_donation))
        .route("/donations/:id/proof", post(attach_proof))
}

const URGENCIES: [&str; 3] = ["urgent", "normal", "flexible"];

#[instrument(skip(state, body))]
async fn create_donation(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<Donation>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }
    if !URGENCIES.contains(&body.urgency.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "urgency must be one of {URGENCIES:?}"
        )));
    }
    let date_format = format_description!("[year]-[month]-[day]");
    if time::Date::parse(&body.expiry_date, &date_format).is_err() {
        return Err(ApiError::BadRequest(
            "expiry_date must be YYYY-MM-DD".into(),
        ));
    }

    let donation = repo::create(
        &state.db,
        NewDonation {
            donor_id: (!body.anonymous).then_some(actor.id),
            title: body.title,
            description: body.description,
            food_type: body.food_type,
            quantity: body.quantity,
            urgency: body.urgency,
            pickup_address: body.pickup_address,
            pickup_city: body.pickup_city,
            expiry_date: body.expiry_date,
            pickup_time: body.pickup_time,
        },
    )
    .await?;

    notify::dispatch(
        &state,
        NotificationEvent {
            kind: EventKind::DonationCreated,
            donation_id: donation.id,
            recipient_id: donation.donor_id,
        },
    );

    Ok((StatusCode::CREATED, Json(donation)))
}

#[instrument(skip(state))]
async fn list_donations(
    State(state): State<AppState>,
    _actor: Actor,
    Query(q): Query<ListDonationsQuery>,
) -> Result<Json<Vec<Donation>>, ApiError> {
    let (limit, offset) = q.page();
    let rows = repo::list_pending(&state.db, q.city.as_deref(), limit, offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
async fn list_my_donations(
    State(state): State<AppState>,
    actor: Actor,
    Query(q): Query<ListDonationsQuery>,
) -> Result<Json<Vec<Donation>>, ApiError> {
    let (limit, offset) = q.page();
    let rows = repo::list_for_user(&state.db, actor.id, limit, offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
async fn get_donation(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<DonationDetails>, ApiError> {
    let donation = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    let proofs = repo::list_proofs(&state.db, id).await?;
    Ok(Json(DonationDetails { donation, proofs }))
}

/// pending -> accepted. The UPDATE is guarded on status = 'pending', so the
/// second of two racing volunteers gets `Conflict`.
#[instrument(skip(state))]
async fn accept_donation(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Donation>, ApiError> {
    let donation = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    lifecycle::authorize_transition(&donation, actor, DonationStatus::Accepted)?;

    let updated = repo::accept(&state.db, id, actor.id)
        .await?
        .ok_or(ApiError::Conflict)?;

    notify::dispatch(
        &state,
        NotificationEvent {
            kind: EventKind::DonationAccepted,
            donation_id: updated.id,
            recipient_id: updated.donor_id,
        },
    );

    Ok(Json(updated))
}

/// accepted -> in_transit, picked_up_at stamped server-side.
#[instrument(skip(state))]
async fn pickup_donation(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Donation>, ApiError> {
    let donation = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    lifecycle::authorize_transition(&donation, actor, DonationStatus::InTransit)?;

    let updated = repo::mark_picked_up(&state.db, id, actor.id)
        .await?
        .ok_or(ApiError::Conflict)?;
    Ok(Json(updated))
}

/// in_transit -> delivered, delivered_at stamped server-side.
#[instrument(skip(state))]
async fn deliver_donation(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Donation>, ApiError> {
    let donation = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    lifecycle::authorize_transition(&donation, actor, DonationStatus::Delivered)?;

    let updated = repo::mark_delivered(&state.db, id, actor.id)
        .await?
        .ok_or(ApiError::Conflict)?;

    notify::dispatch(
        &state,
        NotificationEvent {
            kind: EventKind::DonationDelivered,
            donation_id: updated.id,
            recipient_id: updated.donor_id,
        },
    );

    Ok(Json(updated))
}

#[instrument(skip(state))]
async fn delete_donation(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let donation = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    lifecycle::authorize_delete(&donation, actor)?;

    // Re-checked in the DELETE; a transition racing past us surfaces here.
    if !repo::delete_pending(&state.db, id, actor.id).await? {
        return Err(ApiError::Conflict);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Stores the reference URL returned by the external upload service; the file
/// itself never passes through this service.
#[instrument(skip(state, body))]
async fn attach_proof(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<AttachProofRequest>,
) -> Result<(StatusCode, Json<DonationProof>), ApiError> {
    if body.proof_type != "before" && body.proof_type != "after" {
        return Err(ApiError::BadRequest(
            "proof_type must be 'before' or 'after'".into(),
        ));
    }
    let donation = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    if donation.volunteer_id != Some(actor.id) {
        return Err(ApiError::Unauthorized(
            "only the assigned volunteer can attach proof",
        ));
    }
    if donation.status()? == DonationStatus::Pending {
        return Err(ApiError::InvalidState(
            "donation has not been accepted yet",
        ));
    }

    let proof = repo::upsert_proof(&state.db, id, &body.proof_type, &body.url).await?;
    Ok((StatusCode::CREATED, Json(proof)))
}

/// Who the actor is allowed to open a chat channel with for this donation.
#[instrument(skip(state))]
async fn get_counterpart(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<CounterpartResponse>, ApiError> {
    let donation = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("donation"))?;
    let counterpart = lifecycle::counterpart_of(&donation, actor.id)?
        .ok_or(ApiError::NotFound("counterpart"))?;
    Ok(Json(CounterpartResponse {
        donation_id: id,
        counterpart_id: counterpart,
    }))
}
