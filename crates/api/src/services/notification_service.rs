use chrono::{DateTime, Utc};
use engine::{EngineEvent, LifecycleKind, Role};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

pub const TITLE_BOOKING_REQUESTED: &str = "New Booking Request";
pub const TITLE_BOOKING_CONFIRMED: &str = "Booking Confirmed";
pub const TITLE_BOOKING_REJECTED: &str = "Booking Rejected";
pub const TITLE_BOOKING_CANCELLED: &str = "Booking Cancelled";
pub const TITLE_BOOKING_COMPLETED: &str = "Booking Completed";
pub const TITLE_BOOKING_EXPIRED: &str = "Booking Expired";
pub const TITLE_SLOT_BLOCKED: &str = "Slot Blocked";
pub const TITLE_BLOCK_RELEASED: &str = "Slot Released";

/// What a delivery transport (push, email) would receive for one lifecycle
/// event. Delivery itself is outside this service; the stand-in sink is
/// the log.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_role: Role,
    pub recipient_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub kind: LifecycleKind,
    pub related_entity_id: Uuid,
    pub related_entity_type: &'static str,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NotificationService {
    state: AppState,
    receiver: broadcast::Receiver<EngineEvent>,
}

impl NotificationService {
    pub fn new(state: AppState) -> Self {
        let receiver = state.events().subscribe();
        Self { state, receiver }
    }

    /// Consume the engine event hub until it closes.
    pub async fn run(&mut self) {
        info!("Starting notification dispatcher");

        loop {
            match self.receiver.recv().await {
                Ok(EngineEvent::Lifecycle {
                    kind,
                    booking_id,
                    club_id,
                    customer_id,
                    recipient_role,
                    summary,
                    ..
                }) => {
                    let notification = self.build_notification(
                        kind,
                        booking_id,
                        club_id,
                        customer_id,
                        recipient_role,
                        summary,
                    );
                    self.deliver(notification);
                }
                // Cache invalidations go straight to clients over the SSE
                // feed; nothing to dispatch here.
                Ok(EngineEvent::CacheInvalidation { .. }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Notification dispatcher lagged, {} events dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn build_notification(
        &self,
        kind: LifecycleKind,
        booking_id: Uuid,
        club_id: Uuid,
        customer_id: Option<Uuid>,
        recipient_role: Role,
        summary: String,
    ) -> Notification {
        let recipient_id = match recipient_role {
            Role::Customer => customer_id,
            // Owner-directed notifications resolve to the club's owner.
            Role::Owner | Role::Admin => self
                .state
                .catalog()
                .get_club_any(club_id)
                .ok()
                .map(|club| club.owner_id),
        };

        Notification {
            id: Uuid::new_v4(),
            recipient_role,
            recipient_id,
            title: title_for(kind).to_string(),
            message: summary,
            kind,
            related_entity_id: booking_id,
            related_entity_type: "booking",
            is_read: false,
            created_at: Utc::now(),
        }
    }

    fn deliver(&self, notification: Notification) {
        info!(
            recipient_role = notification.recipient_role.as_str(),
            booking_id = %notification.related_entity_id,
            "{}: {}",
            notification.title,
            notification.message
        );
    }
}

fn title_for(kind: LifecycleKind) -> &'static str {
    match kind {
        LifecycleKind::BookingCreated => TITLE_BOOKING_REQUESTED,
        LifecycleKind::BookingConfirmed => TITLE_BOOKING_CONFIRMED,
        LifecycleKind::BookingRejected => TITLE_BOOKING_REJECTED,
        LifecycleKind::BookingCancelled => TITLE_BOOKING_CANCELLED,
        LifecycleKind::BookingCompleted => TITLE_BOOKING_COMPLETED,
        LifecycleKind::BookingExpired => TITLE_BOOKING_EXPIRED,
        LifecycleKind::SlotBlocked => TITLE_SLOT_BLOCKED,
        LifecycleKind::BlockReleased => TITLE_BLOCK_RELEASED,
    }
}

/// Spawn the notification dispatcher as a background task.
pub fn spawn_notification_service(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut service = NotificationService::new(state);
        service.run().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Address, CreateClubData, GeoPoint, Sport};

    fn state_with_club() -> (AppState, Uuid, Uuid) {
        let state = AppState::new();
        let owner_id = Uuid::new_v4();
        let club = state
            .catalog()
            .create_club(CreateClubData {
                name: "Dispatch Club".into(),
                sport: Sport::Badminton,
                address: Address {
                    street: "1 Net Way".into(),
                    city: "Utrecht".into(),
                    state: "UT".into(),
                    postal_code: "3500".into(),
                },
                location: GeoPoint {
                    longitude: 5.12,
                    latitude: 52.09,
                },
                description: "Badminton halls".into(),
                phone: None,
                email: None,
                images: vec![],
                amenities: vec![],
                owner_id,
            })
            .expect("club");
        (state, club.id, owner_id)
    }

    #[test]
    fn owner_notifications_resolve_the_club_owner() {
        let (state, club_id, owner_id) = state_with_club();
        let service = NotificationService::new(state);

        let notification = service.build_notification(
            LifecycleKind::BookingCreated,
            Uuid::new_v4(),
            club_id,
            Some(Uuid::new_v4()),
            Role::Owner,
            "New booking request".into(),
        );

        assert_eq!(notification.recipient_id, Some(owner_id));
        assert_eq!(notification.title, TITLE_BOOKING_REQUESTED);
        assert_eq!(notification.related_entity_type, "booking");
        assert!(!notification.is_read);
    }

    #[test]
    fn customer_notifications_carry_the_customer_id() {
        let (state, club_id, _) = state_with_club();
        let service = NotificationService::new(state);
        let customer_id = Uuid::new_v4();

        let notification = service.build_notification(
            LifecycleKind::BookingConfirmed,
            Uuid::new_v4(),
            club_id,
            Some(customer_id),
            Role::Customer,
            "Booking confirmed".into(),
        );

        assert_eq!(notification.recipient_id, Some(customer_id));
        assert_eq!(notification.title, TITLE_BOOKING_CONFIRMED);
    }
}
