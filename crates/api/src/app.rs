use std::time::Duration;

use axum::{
    http::{
        header::{HeaderName, HeaderValue, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::identity::{identity_middleware, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::routes::{availability, blocks, bookings, clubs, events, services};
use crate::state::AppState;

/// Build the Axum router: discovery reads are public, catalog writes are
/// owner/admin-gated, booking mutations go through the engine's own
/// authorization.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Simple liveness check.
        .route("/health", get(health))
        // Club discovery + owner management
        .route("/clubs", get(clubs::list_clubs).post(clubs::create_club))
        .route(
            "/clubs/{id}",
            get(clubs::get_club)
                .patch(clubs::update_club)
                .delete(clubs::delete_club),
        )
        // Services
        .route("/services/club/{club_id}", get(services::list_for_club))
        .route("/services", post(services::create_service))
        .route("/services/{id}", patch(services::update_service))
        // Availability
        .route("/availability", get(availability::get_availability))
        // Bookings
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/mine", get(bookings::my_bookings))
        .route("/bookings/club/{club_id}", get(bookings::club_bookings))
        .route("/bookings/{id}", patch(bookings::update_notes))
        .route("/bookings/{id}/status", post(bookings::transition_booking))
        // Owner blocks
        .route("/blocks", post(blocks::create_block))
        .route("/blocks/{id}", delete(blocks::delete_block))
        // Lifecycle + cache-invalidation push channel
        .route("/events/stream", get(events::event_stream))
        // App state (stores + event hub)
        .with_state(state)
        // Identity headers from the upstream provider
        .layer(middleware::from_fn(identity_middleware))
        // Useful default middlewares
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer({
            let allowed_origins = std::env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:3001".to_string());

            let origins: Vec<HeaderValue> = allowed_origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    CONTENT_TYPE,
                    HeaderName::from_static(USER_ID_HEADER),
                    HeaderName::from_static(USER_ROLE_HEADER),
                ])
                .allow_credentials(true)
        })
}

async fn health() -> &'static str {
    "ok"
}
