use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Role;

const EVENT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleKind {
    BookingCreated,
    BookingConfirmed,
    BookingRejected,
    BookingCancelled,
    BookingCompleted,
    BookingExpired,
    SlotBlocked,
    BlockReleased,
}

/// Everything the engine tells the outside world. Lifecycle events feed the
/// notification dispatcher; cache invalidations tell clients which catalog
/// keys went stale (the push side channel the booking clients listen on).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Lifecycle {
        kind: LifecycleKind,
        booking_id: Uuid,
        club_id: Uuid,
        service_id: Uuid,
        customer_id: Option<Uuid>,
        recipient_role: Role,
        summary: String,
    },
    CacheInvalidation {
        club_id: Uuid,
        service_id: Option<Uuid>,
    },
}

/// Broadcast fabric for engine events. Subscribers come and go; publishing
/// with no live subscriber is not an error, and a lagging subscriber only
/// loses its own backlog.
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }

    pub fn invalidate(&self, club_id: Uuid, service_id: Option<Uuid>) {
        self.publish(EngineEvent::CacheInvalidation {
            club_id,
            service_id,
        });
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
