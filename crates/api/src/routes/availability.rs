use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use engine::{availability, TimeSlot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub service_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

/// Slots for a (service, date) pair, computed fresh from the catalog and
/// the ledger on every call. Past dates compute like any other; hiding
/// them is the client's concern.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let service = state.catalog().get_service(query.service_id)?;
    let bookings = state
        .ledger()
        .find_by_service_and_date(service.id, query.date);
    let slots = availability::compute_slots(&service, query.date, &bookings);

    Ok(Json(AvailabilityResponse {
        service_id: service.id,
        date: query.date,
        slots,
    }))
}
