use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime};
use engine::{lifecycle, models::hhmm, Booking, CreateBlockParams};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::permissions::require_identity;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub service_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Owner withholds a slot (maintenance, private events). The engine checks
/// that the caller manages the owning club.
pub async fn create_block(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let identity = require_identity(current)?;

    let block = lifecycle::create_block(
        state.catalog(),
        state.ledger(),
        state.events(),
        identity.actor(),
        CreateBlockParams {
            service_id: req.service_id,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            notes: req.notes,
        },
    )?;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn delete_block(
    State(state): State<AppState>,
    Path(block_id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    let identity = require_identity(current)?;

    lifecycle::delete_block(
        state.catalog(),
        state.ledger(),
        state.events(),
        identity.actor(),
        block_id,
    )?;
    Ok(StatusCode::NO_CONTENT)
}
