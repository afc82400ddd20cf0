mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn open_day_tiles_the_operating_window() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Availability Club");
    let service_id = create_test_service(&state, club_id);

    let (status, body) = send(
        &router,
        "GET",
        &format!("/availability?service_id={}&date={}", service_id, test_monday()),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    // 09:00-17:00 in 60-minute steps.
    assert_eq!(slots.len(), 8);
    assert_eq!(slots[0]["start_time"], "09:00");
    assert_eq!(slots[0]["end_time"], "10:00");
    assert!(slots.iter().all(|s| s["is_available"] == true));
}

#[tokio::test]
async fn closed_day_returns_no_slots() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Weekend Club");
    let service_id = create_test_service(&state, club_id);

    // 2026-08-15 is a Saturday; the test service runs Monday-Friday.
    let (status, body) = send(
        &router,
        "GET",
        &format!("/availability?service_id={}&date=2026-08-15", service_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn a_booking_closes_exactly_its_own_slot() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Busy Club");
    let service_id = create_test_service(&state, club_id);

    let (status, _) = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(json!({
            "service_id": service_id,
            "date": test_monday().to_string(),
            "start_time": "09:00",
            "end_time": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &router,
        "GET",
        &format!("/availability?service_id={}&date={}", service_id, test_monday()),
        None,
        None,
    )
    .await;

    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots[0]["is_available"], false);
    assert!(slots[1..].iter().all(|s| s["is_available"] == true));
}

#[tokio::test]
async fn unknown_service_is_a_404() {
    let (_state, router) = setup_app();

    let (status, _) = send(
        &router,
        "GET",
        &format!("/availability?service_id={}&date=2026-08-10", Uuid::new_v4()),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
