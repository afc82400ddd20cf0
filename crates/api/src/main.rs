use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::app::build_router;
use api::seed::seed_demo_catalog;
use api::services::{spawn_expiry_service, spawn_notification_service};
use api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let state = AppState::new();

    // Optional demo catalog for local exploration (SEED_DEMO_DATA=true)
    let seed_demo = std::env::var("SEED_DEMO_DATA")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);
    if seed_demo {
        seed_demo_catalog(&state)?;
    }

    // Forward lifecycle events to the notification boundary
    let _notification_handle = spawn_notification_service(state.clone());
    tracing::info!("Notification dispatcher started");

    // Settle overdue bookings in the background
    let _expiry_handle = spawn_expiry_service(state.clone());
    tracing::info!("Booking expiry service started");

    let app = build_router(state);

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
