mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use uuid::Uuid;

fn booking_body(service_id: Uuid, start: &str, end: &str) -> serde_json::Value {
    json!({
        "service_id": service_id,
        "date": test_monday().to_string(),
        "start_time": start,
        "end_time": end
    })
}

#[tokio::test]
async fn booking_starts_pending_with_the_derived_price() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Pricing Club");
    let service_id = create_test_service(&state, club_id);
    let customer = Uuid::new_v4();

    let (status, body) = send(
        &router,
        "POST",
        "/bookings",
        Some((customer, "customer")),
        Some(booking_body(service_id, "10:00", "12:00")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    // 20.00/hour for two hours.
    assert_eq!(body["total_price_cents"], 4000);
    assert_eq!(body["customer_id"], customer.to_string());
    assert_eq!(body["start_time"], "10:00");
}

#[tokio::test]
async fn anonymous_booking_attempts_are_unauthorized() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Login Club");
    let service_id = create_test_service(&state, club_id);

    let (status, _) = send(
        &router,
        "POST",
        "/bookings",
        None,
        Some(booking_body(service_id, "10:00", "11:00")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn off_grid_times_are_rejected() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Grid Club");
    let service_id = create_test_service(&state, club_id);

    let (status, _) = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(booking_body(service_id, "10:30", "11:30")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn double_booking_a_full_slot_conflicts() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Full Club");
    let service_id = create_test_service(&state, club_id);

    let (status, _) = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(booking_body(service_id, "09:00", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(booking_body(service_id, "09:00", "10:00")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "this time is no longer available, please choose another"
    );
}

#[tokio::test]
async fn racing_for_the_last_slot_admits_exactly_one() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Race Club");
    let service_id = create_test_service(&state, club_id);

    let first = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(booking_body(service_id, "09:00", "10:00")),
    );
    let second = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(booking_body(service_id, "09:00", "10:00")),
    );

    let ((status_a, _), (status_b, _)) = tokio::join!(first, second);
    let mut statuses = [status_a, status_b];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn capacity_two_takes_two_bookings_before_conflicting() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Doubles Club");
    let service_id = create_test_service_with_capacity(&state, club_id, 2);

    for _ in 0..2 {
        let (status, _) = send(
            &router,
            "POST",
            "/bookings",
            Some((Uuid::new_v4(), "customer")),
            Some(booking_body(service_id, "09:00", "10:00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(booking_body(service_id, "09:00", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn customers_see_their_own_bookings() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "History Club");
    let service_id = create_test_service(&state, club_id);
    let customer = Uuid::new_v4();

    for (start, end) in [("09:00", "10:00"), ("11:00", "12:00")] {
        let (status, _) = send(
            &router,
            "POST",
            "/bookings",
            Some((customer, "customer")),
            Some(booking_body(service_id, start, end)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, mine) = send(
        &router,
        "GET",
        "/bookings/mine",
        Some((customer, "customer")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let (status, other) = send(
        &router,
        "GET",
        "/bookings/mine",
        Some((Uuid::new_v4(), "customer")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(other.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn booking_notes_are_editable_after_creation() {
    let (state, router) = setup_app();
    let (club_id, _) = create_test_club(&state, "Notes Club");
    let service_id = create_test_service(&state, club_id);
    let customer = Uuid::new_v4();

    let (status, booking) = send(
        &router,
        "POST",
        "/bookings",
        Some((customer, "customer")),
        Some(booking_body(service_id, "09:00", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let booking_id = booking["id"].as_str().unwrap();

    let (status, updated) = send(
        &router,
        "PATCH",
        &format!("/bookings/{}", booking_id),
        Some((customer, "customer")),
        Some(json!({ "notes": "left-handed racket please" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "left-handed racket please");

    // Strangers cannot touch someone else's booking.
    let (status, _) = send(
        &router,
        "PATCH",
        &format!("/bookings/{}", booking_id),
        Some((Uuid::new_v4(), "customer")),
        Some(json!({ "notes": "hijack" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn club_booking_list_is_owner_only() {
    let (state, router) = setup_app();
    let (club_id, owner_id) = create_test_club(&state, "Dashboard Club");
    let service_id = create_test_service(&state, club_id);

    let (status, _) = send(
        &router,
        "POST",
        "/bookings",
        Some((Uuid::new_v4(), "customer")),
        Some(booking_body(service_id, "09:00", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &router,
        "GET",
        &format!("/bookings/club/{}", club_id),
        Some((Uuid::new_v4(), "customer")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listing) = send(
        &router,
        "GET",
        &format!("/bookings/club/{}", club_id),
        Some((owner_id, "owner")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);
}
