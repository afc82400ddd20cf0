use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime};
use engine::{lifecycle, models::hhmm, Booking, BookingStatus, CreateBookingParams};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::permissions::{require_club_owner, require_identity};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let identity = require_identity(current)?;

    let booking = lifecycle::create_booking(
        state.catalog(),
        state.ledger(),
        state.events(),
        identity.actor(),
        CreateBookingParams {
            service_id: req.service_id,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            notes: req.notes,
        },
    )?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let identity = require_identity(current)?;
    Ok(Json(state.ledger().find_by_user(identity.user_id)))
}

pub async fn club_bookings(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Booking>>, AppError> {
    require_club_owner(&state, current, club_id)?;
    Ok(Json(state.ledger().find_by_club(club_id)))
}

pub async fn update_notes(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<Json<Booking>, AppError> {
    let identity = require_identity(current)?;

    let booking = lifecycle::update_notes(
        state.catalog(),
        state.ledger(),
        state.events(),
        identity.actor(),
        booking_id,
        req.notes,
    )?;
    Ok(Json(booking))
}

/// Move a booking along its status graph. Who may take which edge is
/// enforced by the engine; this handler only supplies the caller identity.
pub async fn transition_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<Booking>, AppError> {
    let identity = require_identity(current)?;

    let booking = lifecycle::transition_status(
        state.catalog(),
        state.ledger(),
        state.events(),
        identity.actor(),
        booking_id,
        req.status,
    )?;
    Ok(Json(booking))
}
