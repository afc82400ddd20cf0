use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveTime;
use engine::{models::hhmm, CreateServiceData, DayOfWeek, Service, Sport, UpdateServiceData};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::permissions::require_club_owner;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub club_id: Uuid,
    pub name: String,
    pub sport_type: Sport,
    pub hourly_price_cents: i32,
    pub capacity: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub available_days: Vec<DayOfWeek>,
    #[serde(with = "hhmm")]
    pub opening_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub closing_time: NaiveTime,
    pub slot_duration_minutes: i32,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hourly_price_cents: Option<i32>,
    pub capacity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub available_days: Option<Vec<DayOfWeek>>,
    #[serde(default, with = "hhmm_option")]
    pub opening_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub closing_time: Option<NaiveTime>,
    pub slot_duration_minutes: Option<i32>,
}

/// `HH:MM` deserialization for optional patch fields.
mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        value
            .map(|s| NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub async fn list_for_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, AppError> {
    Ok(Json(state.catalog().list_services_for_club(club_id)?))
}

pub async fn create_service(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    require_club_owner(&state, current, req.club_id)?;

    let service = state.catalog().create_service(CreateServiceData {
        club_id: req.club_id,
        name: req.name,
        sport_type: req.sport_type,
        hourly_price_cents: req.hourly_price_cents,
        capacity: req.capacity,
        description: req.description,
        images: req.images,
        available_days: req.available_days,
        opening_time: req.opening_time,
        closing_time: req.closing_time,
        slot_duration_minutes: req.slot_duration_minutes,
    })?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    let existing = state.catalog().get_service(service_id)?;
    require_club_owner(&state, current, existing.club_id)?;

    let service = state.catalog().update_service(
        service_id,
        UpdateServiceData {
            name: req.name,
            description: req.description,
            hourly_price_cents: req.hourly_price_cents,
            capacity: req.capacity,
            images: req.images,
            is_active: req.is_active,
            available_days: req.available_days,
            opening_time: req.opening_time,
            closing_time: req.closing_time,
            slot_duration_minutes: req.slot_duration_minutes,
        },
    )?;
    Ok(Json(service))
}
