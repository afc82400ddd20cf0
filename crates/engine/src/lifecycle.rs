use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventHub, LifecycleKind};
use crate::ledger::BookingLedger;
use crate::models::{Actor, Booking, BookingStatus, Club, DayOfWeek, Role, Service};

#[derive(Debug, Clone)]
pub struct CreateBookingParams {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateBlockParams {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
}

/// The booking status graph. Everything else is an invalid transition;
/// terminal statuses absorb, and `blocked` entries leave the ledger through
/// `delete_block`, never through a transition.
pub fn allowed_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Rejected)
            | (Pending, Cancelled)
            | (Pending, Expired)
            | (Confirmed, Completed)
            | (Confirmed, Cancelled)
            | (Confirmed, Expired)
    )
}

fn authorize_transition(
    actor: Actor,
    booking: &Booking,
    club: &Club,
    to: BookingStatus,
) -> EngineResult<()> {
    use BookingStatus::*;
    match to {
        Confirmed | Rejected => {
            if actor.manages_club(club) {
                Ok(())
            } else {
                Err(EngineError::forbidden(
                    "only the club owner or an administrator can confirm or reject bookings",
                ))
            }
        }
        Cancelled => {
            let is_customer = actor.user_id().is_some() && actor.user_id() == booking.customer_id;
            if is_customer || actor.manages_club(club) {
                Ok(())
            } else {
                Err(EngineError::forbidden(
                    "only the booking customer or the club owner can cancel a booking",
                ))
            }
        }
        Completed | Expired => {
            if actor == Actor::System {
                Ok(())
            } else {
                Err(EngineError::forbidden(
                    "completed and expired are applied by the system",
                ))
            }
        }
        // Unreachable through the graph, but the guard stays exhaustive.
        Pending | Blocked => Err(EngineError::forbidden(
            "bookings cannot be moved back into this status",
        )),
    }
}

fn transition_kind(to: BookingStatus) -> Option<LifecycleKind> {
    match to {
        BookingStatus::Confirmed => Some(LifecycleKind::BookingConfirmed),
        BookingStatus::Rejected => Some(LifecycleKind::BookingRejected),
        BookingStatus::Cancelled => Some(LifecycleKind::BookingCancelled),
        BookingStatus::Completed => Some(LifecycleKind::BookingCompleted),
        BookingStatus::Expired => Some(LifecycleKind::BookingExpired),
        BookingStatus::Pending | BookingStatus::Blocked => None,
    }
}

fn slot_summary(service: &Service, booking: &Booking) -> String {
    format!(
        "{} on {} {}-{}",
        service.name,
        booking.date,
        booking.start_time.format("%H:%M"),
        booking.end_time.format("%H:%M"),
    )
}

/// Start/end must land on the service's slot grid and inside the operating
/// window, covering at least one slot.
fn validate_slot_request(
    service: &Service,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> EngineResult<()> {
    if !service.bookable_on(date) {
        let day = DayOfWeek::from(chrono::Datelike::weekday(&date));
        return Err(EngineError::validation(format!(
            "{} is not available on {}",
            service.name,
            day.as_str()
        )));
    }
    if start >= end {
        return Err(EngineError::validation("start time must be before end time"));
    }
    if start < service.opening_time || end > service.closing_time {
        return Err(EngineError::validation(format!(
            "requested time falls outside opening hours ({}-{})",
            service.opening_time.format("%H:%M"),
            service.closing_time.format("%H:%M"),
        )));
    }

    let slot = service.slot_duration_minutes as i64;
    let offset = (start - service.opening_time).num_minutes();
    let duration = (end - start).num_minutes();
    if offset % slot != 0 || duration % slot != 0 {
        return Err(EngineError::validation(format!(
            "times must align to the {}-minute slot grid",
            slot
        )));
    }
    Ok(())
}

/// Create a customer booking request. The capacity re-check happens inside
/// the ledger's critical section, so a lost race surfaces as
/// `SlotUnavailable` rather than an over-booked slot.
pub fn create_booking(
    catalog: &CatalogStore,
    ledger: &BookingLedger,
    events: &EventHub,
    actor: Actor,
    params: CreateBookingParams,
) -> EngineResult<Booking> {
    let Actor::User { id: customer_id, .. } = actor else {
        return Err(EngineError::forbidden(
            "bookings are created by signed-in customers",
        ));
    };

    let service = catalog.get_service(params.service_id)?;
    let club = catalog.get_club(service.club_id)?;
    if !service.is_active {
        return Err(EngineError::validation(format!(
            "{} is not open for booking",
            service.name
        )));
    }
    validate_slot_request(&service, params.date, params.start_time, params.end_time)?;

    let now = Utc::now();
    let duration = (params.end_time - params.start_time).num_minutes();
    let booking = Booking {
        id: Uuid::new_v4(),
        customer_id: Some(customer_id),
        club_id: club.id,
        service_id: service.id,
        date: params.date,
        start_time: params.start_time,
        end_time: params.end_time,
        status: BookingStatus::Pending,
        total_price_cents: service.price_for_duration(duration),
        notes: params.notes,
        created_at: now,
        updated_at: now,
    };

    let booking = ledger.insert_checked(&service, booking)?;

    events.publish(EngineEvent::Lifecycle {
        kind: LifecycleKind::BookingCreated,
        booking_id: booking.id,
        club_id: club.id,
        service_id: service.id,
        customer_id: booking.customer_id,
        recipient_role: Role::Owner,
        summary: format!("New booking request for {}", slot_summary(&service, &booking)),
    });
    events.invalidate(club.id, Some(service.id));

    Ok(booking)
}

/// Move a booking along the status graph. The graph is checked before
/// authorization, so an impossible edge reports `InvalidTransition` no
/// matter who asks; a legal edge by the wrong actor reports `Forbidden`.
/// Exactly one lifecycle event is emitted per successful transition, which
/// is what makes a repeated confirm safe: the second call fails and nobody
/// is notified twice.
pub fn transition_status(
    catalog: &CatalogStore,
    ledger: &BookingLedger,
    events: &EventHub,
    actor: Actor,
    booking_id: Uuid,
    new_status: BookingStatus,
) -> EngineResult<Booking> {
    let current = ledger.get(booking_id)?;
    // Soft-deleted clubs keep their booking history manageable.
    let club = catalog.get_club_any(current.club_id)?;

    let updated = ledger.update_status(booking_id, |booking| {
        if !allowed_transition(booking.status, new_status) {
            return Err(EngineError::InvalidTransition {
                from: booking.status,
                to: new_status,
            });
        }
        authorize_transition(actor, booking, &club, new_status)?;
        Ok(new_status)
    })?;

    let service = catalog.get_service(updated.service_id)?;
    if let Some(kind) = transition_kind(new_status) {
        let actor_is_customer =
            actor.user_id().is_some() && actor.user_id() == updated.customer_id;
        let recipient_role = match new_status {
            // A customer cancelling notifies the club; everything else goes
            // to the customer.
            BookingStatus::Cancelled if actor_is_customer => Role::Owner,
            _ => Role::Customer,
        };
        events.publish(EngineEvent::Lifecycle {
            kind,
            booking_id: updated.id,
            club_id: club.id,
            service_id: updated.service_id,
            customer_id: updated.customer_id,
            recipient_role,
            summary: format!(
                "Booking for {} is now {}",
                slot_summary(&service, &updated),
                new_status
            ),
        });
    }
    events.invalidate(club.id, Some(updated.service_id));

    Ok(updated)
}

/// Owner withholds a slot without a customer. The block occupies capacity
/// exactly like a booking, so it goes through the same atomic insert.
pub fn create_block(
    catalog: &CatalogStore,
    ledger: &BookingLedger,
    events: &EventHub,
    actor: Actor,
    params: CreateBlockParams,
) -> EngineResult<Booking> {
    let service = catalog.get_service(params.service_id)?;
    let club = catalog.get_club_any(service.club_id)?;
    if !actor.manages_club(&club) {
        return Err(EngineError::forbidden(
            "only the club owner or an administrator can block slots",
        ));
    }
    validate_slot_request(&service, params.date, params.start_time, params.end_time)?;

    let now = Utc::now();
    let block = Booking {
        id: Uuid::new_v4(),
        customer_id: None,
        club_id: club.id,
        service_id: service.id,
        date: params.date,
        start_time: params.start_time,
        end_time: params.end_time,
        status: BookingStatus::Blocked,
        total_price_cents: 0,
        notes: params.notes,
        created_at: now,
        updated_at: now,
    };

    let block = ledger.insert_checked(&service, block)?;

    events.publish(EngineEvent::Lifecycle {
        kind: LifecycleKind::SlotBlocked,
        booking_id: block.id,
        club_id: club.id,
        service_id: service.id,
        customer_id: None,
        recipient_role: Role::Owner,
        summary: format!("Slot blocked: {}", slot_summary(&service, &block)),
    });
    events.invalidate(club.id, Some(service.id));

    Ok(block)
}

/// Update a booking's free-text notes. Notes and status are the only
/// fields open after creation; everything else is frozen.
pub fn update_notes(
    catalog: &CatalogStore,
    ledger: &BookingLedger,
    events: &EventHub,
    actor: Actor,
    booking_id: Uuid,
    notes: Option<String>,
) -> EngineResult<Booking> {
    let booking = ledger.get(booking_id)?;
    let club = catalog.get_club_any(booking.club_id)?;
    let is_customer = actor.user_id().is_some() && actor.user_id() == booking.customer_id;
    if !is_customer && !actor.manages_club(&club) {
        return Err(EngineError::forbidden(
            "only the booking customer or the club owner can edit notes",
        ));
    }

    let updated = ledger.set_notes(booking_id, notes)?;
    events.invalidate(club.id, Some(updated.service_id));
    Ok(updated)
}

/// Hard-remove an owner block, releasing its capacity. Customer bookings
/// never pass this gate.
pub fn delete_block(
    catalog: &CatalogStore,
    ledger: &BookingLedger,
    events: &EventHub,
    actor: Actor,
    booking_id: Uuid,
) -> EngineResult<()> {
    let booking = ledger.get(booking_id)?;
    let club = catalog.get_club_any(booking.club_id)?;
    if !actor.manages_club(&club) {
        return Err(EngineError::forbidden(
            "only the club owner or an administrator can release blocked slots",
        ));
    }

    let removed = ledger.remove_block(booking_id)?;

    events.publish(EngineEvent::Lifecycle {
        kind: LifecycleKind::BlockReleased,
        booking_id: removed.id,
        club_id: club.id,
        service_id: removed.service_id,
        customer_id: None,
        recipient_role: Role::Owner,
        summary: "Blocked slot released".into(),
    });
    events.invalidate(club.id, Some(removed.service_id));

    Ok(())
}

/// System sweep over bookings whose window has passed: a request nobody
/// acted on expires, a confirmed booking settles as completed. Returns how
/// many bookings changed.
pub fn expire_due(
    catalog: &CatalogStore,
    ledger: &BookingLedger,
    events: &EventHub,
    now: DateTime<Utc>,
) -> usize {
    let mut settled = 0;
    for booking in ledger.find_due(now) {
        let target = match booking.status {
            BookingStatus::Pending => BookingStatus::Expired,
            BookingStatus::Confirmed => BookingStatus::Completed,
            _ => continue,
        };
        match transition_status(catalog, ledger, events, Actor::System, booking.id, target) {
            Ok(_) => settled += 1,
            Err(e) => warn!("Failed to settle overdue booking {}: {}", booking.id, e),
        }
    }
    settled
}
