#![allow(dead_code)]

use api::app::build_router;
use api::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use engine::{Address, CreateClubData, CreateServiceData, DayOfWeek, GeoPoint, Sport};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

pub fn setup_app() -> (AppState, Router) {
    let state = AppState::new();
    let router = build_router(state.clone());
    (state, router)
}

/// Drive one request through the router, as the given identity, and parse
/// the JSON body (Null for empty responses).
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    identity: Option<(Uuid, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, role)) = identity {
        builder = builder
            .header("x-user-id", user_id.to_string())
            .header("x-user-role", role);
    }

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

/// Insert a club directly through the store, returning (club_id, owner_id).
pub fn create_test_club(state: &AppState, name: &str) -> (Uuid, Uuid) {
    let owner_id = Uuid::new_v4();
    let club = state
        .catalog()
        .create_club(CreateClubData {
            name: name.into(),
            sport: Sport::Padel,
            address: Address {
                street: "1 Test Street".into(),
                city: "Testville".into(),
                state: "TS".into(),
                postal_code: "0000".into(),
            },
            location: GeoPoint {
                longitude: 4.35,
                latitude: 50.85,
            },
            description: "A club used in tests".into(),
            phone: None,
            email: None,
            images: vec![],
            amenities: vec![],
            owner_id,
        })
        .expect("test club");
    (club.id, owner_id)
}

/// Weekday service, 09:00-17:00 in 60-minute slots, capacity 1, 20.00/hour.
pub fn create_test_service(state: &AppState, club_id: Uuid) -> Uuid {
    create_test_service_with_capacity(state, club_id, 1)
}

pub fn create_test_service_with_capacity(state: &AppState, club_id: Uuid, capacity: i32) -> Uuid {
    state
        .catalog()
        .create_service(CreateServiceData {
            club_id,
            name: "Court 1".into(),
            sport_type: Sport::Padel,
            hourly_price_cents: 2000,
            capacity,
            description: String::new(),
            images: vec![],
            available_days: vec![
                DayOfWeek::Monday,
                DayOfWeek::Tuesday,
                DayOfWeek::Wednesday,
                DayOfWeek::Thursday,
                DayOfWeek::Friday,
            ],
            opening_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            closing_time: NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"),
            slot_duration_minutes: 60,
        })
        .expect("test service")
        .id
}

// 2026-08-10 is a Monday, inside the test service's available days.
pub fn test_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 10).expect("valid date")
}
