use std::time::Duration;

use chrono::Utc;
use engine::lifecycle;
use tokio::time::{interval, Interval};
use tracing::info;

use crate::state::AppState;

const DEFAULT_SWEEP_SECONDS: u64 = 300;

/// Background sweep that settles bookings whose window has passed:
/// unanswered requests expire, confirmed bookings complete. Runs as the
/// system actor; no caller can trigger these transitions directly.
pub struct ExpiryService {
    state: AppState,
    interval: Interval,
}

impl ExpiryService {
    pub fn new(state: AppState) -> Self {
        let sweep_seconds = std::env::var("EXPIRY_SWEEP_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_SECONDS);
        let interval = interval(Duration::from_secs(sweep_seconds));

        Self { state, interval }
    }

    pub async fn run(&mut self) {
        info!("Starting booking expiry service");

        loop {
            self.interval.tick().await;

            let settled = lifecycle::expire_due(
                self.state.catalog(),
                self.state.ledger(),
                self.state.events(),
                Utc::now(),
            );
            if settled > 0 {
                info!("Settled {} overdue bookings", settled);
            }
        }
    }
}

/// Spawn the expiry sweep as a background task.
pub fn spawn_expiry_service(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut service = ExpiryService::new(state);
        service.run().await;
    })
}
