use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::availability;
use crate::error::{EngineError, EngineResult};
use crate::models::{Booking, BookingStatus, Service};

#[derive(Default)]
struct LedgerInner {
    bookings: HashMap<Uuid, Booking>,
    /// (service_id, date) -> booking ids, the hot lookup for availability
    /// and the capacity check.
    by_slot: HashMap<(Uuid, NaiveDate), Vec<Uuid>>,
}

impl LedgerInner {
    fn slot_bookings(&self, service_id: Uuid, date: NaiveDate) -> Vec<Booking> {
        self.by_slot
            .get(&(service_id, date))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.bookings.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The authoritative set of booking records. Customer bookings are never
/// deleted, only transitioned to a terminal status; owner blocks are the
/// one exception and may be hard-removed.
///
/// A single store-wide write lock serializes every mutation, which makes
/// the capacity check and the insert one critical section. Coarser than a
/// per-(service, date) mutex, but correct for a single-instance deployment
/// and immune to lock-ordering mistakes.
pub struct BookingLedger {
    inner: RwLock<LedgerInner>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerInner::default()),
        }
    }

    /// Atomic check-and-insert: re-counts capacity for every slot window the
    /// booking covers while holding the write lock, so two racing calls for
    /// the last unit cannot both succeed.
    pub fn insert_checked(&self, service: &Service, booking: Booking) -> EngineResult<Booking> {
        let mut inner = self.inner.write();

        let existing = inner.slot_bookings(service.id, booking.date);
        for (start, end) in availability::slot_windows(service) {
            if !availability::intervals_overlap(booking.start_time, booking.end_time, start, end) {
                continue;
            }
            let taken = availability::occupying_overlaps(&existing, start, end);
            if taken >= service.capacity as usize {
                return Err(EngineError::SlotUnavailable);
            }
        }

        inner
            .by_slot
            .entry((service.id, booking.date))
            .or_default()
            .push(booking.id);
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    pub fn get(&self, booking_id: Uuid) -> EngineResult<Booking> {
        self.inner
            .read()
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("booking", booking_id))
    }

    pub fn find_by_service_and_date(&self, service_id: Uuid, date: NaiveDate) -> Vec<Booking> {
        let mut bookings = self.inner.read().slot_bookings(service_id, date);
        bookings.sort_by_key(|b| b.start_time);
        bookings
    }

    pub fn find_by_club(&self, club_id: Uuid) -> Vec<Booking> {
        let inner = self.inner.read();
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.club_id == club_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (b.date, b.start_time).cmp(&(a.date, a.start_time)));
        bookings
    }

    pub fn find_by_user(&self, user_id: Uuid) -> Vec<Booking> {
        let inner = self.inner.read();
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.customer_id == Some(user_id))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (b.date, b.start_time).cmp(&(a.date, a.start_time)));
        bookings
    }

    /// Check-and-set for the status field. The decision closure sees the
    /// booking as it is under the write lock and returns the status to move
    /// to, so concurrent transitions on the same booking serialize instead
    /// of clobbering each other. Date, time, service, and customer are
    /// frozen at creation; a reschedule is a cancel plus a new booking.
    pub fn update_status(
        &self,
        booking_id: Uuid,
        decide: impl FnOnce(&Booking) -> EngineResult<BookingStatus>,
    ) -> EngineResult<Booking> {
        let mut inner = self.inner.write();
        let booking = inner
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| EngineError::not_found("booking", booking_id))?;

        let next = decide(booking)?;
        booking.status = next;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    pub fn set_notes(&self, booking_id: Uuid, notes: Option<String>) -> EngineResult<Booking> {
        let mut inner = self.inner.write();
        let booking = inner
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| EngineError::not_found("booking", booking_id))?;
        booking.notes = notes;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    /// Hard removal, for owner blocks only. Customer bookings stay on the
    /// ledger forever as history.
    pub fn remove_block(&self, booking_id: Uuid) -> EngineResult<Booking> {
        let mut inner = self.inner.write();
        let booking = inner
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("booking", booking_id))?;

        if booking.status != BookingStatus::Blocked {
            return Err(EngineError::forbidden(
                "only blocked slots can be deleted; customer bookings are kept as history",
            ));
        }

        inner.bookings.remove(&booking_id);
        if let Some(ids) = inner.by_slot.get_mut(&(booking.service_id, booking.date)) {
            ids.retain(|id| *id != booking_id);
        }
        Ok(booking)
    }

    /// Non-terminal bookings whose window has fully passed, for the expiry
    /// sweep. Blocks are excluded; owners clear those themselves.
    pub fn find_due(&self, now: DateTime<Utc>) -> Vec<Booking> {
        let cutoff = now.naive_utc();
        self.inner
            .read()
            .bookings
            .values()
            .filter(|b| {
                matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed)
                    && b.ends_at() < cutoff
            })
            .cloned()
            .collect()
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOfWeek, Sport};
    use chrono::NaiveTime;
    use std::sync::Arc;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn service(capacity: i32) -> Service {
        Service {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            name: "Court 1".into(),
            sport_type: Sport::Squash,
            hourly_price_cents: 1800,
            capacity,
            description: String::new(),
            images: vec![],
            is_active: true,
            available_days: vec![DayOfWeek::Monday],
            opening_time: hm(9, 0),
            closing_time: hm(12, 0),
            slot_duration_minutes: 60,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking(service: &Service, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_id: Some(Uuid::new_v4()),
            club_id: service.club_id,
            service_id: service.id,
            date,
            start_time: start,
            end_time: end,
            status: BookingStatus::Pending,
            total_price_cents: 1800,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    #[test]
    fn insert_checked_rejects_when_capacity_exhausted() {
        let ledger = BookingLedger::new();
        let service = service(1);

        ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();
        let err = ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::SlotUnavailable));
    }

    #[test]
    fn adjacent_slots_do_not_conflict() {
        let ledger = BookingLedger::new();
        let service = service(1);

        ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();
        ledger
            .insert_checked(&service, booking(&service, monday(), hm(10, 0), hm(11, 0)))
            .unwrap();
    }

    #[test]
    fn multi_window_booking_blocks_partial_overlap() {
        let ledger = BookingLedger::new();
        let service = service(1);

        ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(11, 0)))
            .unwrap();
        let err = ledger
            .insert_checked(&service, booking(&service, monday(), hm(10, 0), hm(11, 0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::SlotUnavailable));
    }

    #[test]
    fn capacity_admits_exactly_that_many_overlaps() {
        let ledger = BookingLedger::new();
        let service = service(2);

        ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();
        ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();
        let err = ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::SlotUnavailable));
    }

    #[test]
    fn racing_inserts_for_the_last_unit_admit_exactly_one() {
        let ledger = Arc::new(BookingLedger::new());
        let service = Arc::new(service(1));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            let service = Arc::clone(&service);
            handles.push(std::thread::spawn(move || {
                ledger
                    .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
                    .is_ok()
            }));
        }

        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(wins, 1);

        let day = ledger.find_by_service_and_date(service.id, monday());
        assert_eq!(day.len(), 1);
    }

    #[test]
    fn terminal_booking_releases_capacity_for_new_inserts() {
        let ledger = BookingLedger::new();
        let service = service(1);

        let first = ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();
        ledger
            .update_status(first.id, |_| Ok(BookingStatus::Cancelled))
            .unwrap();

        ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();
    }

    #[test]
    fn update_status_propagates_the_decision_error() {
        let ledger = BookingLedger::new();
        let service = service(1);
        let inserted = ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();

        let err = ledger
            .update_status(inserted.id, |b| {
                Err(EngineError::InvalidTransition { from: b.status, to: b.status })
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
        assert_eq!(ledger.get(inserted.id).unwrap().status, BookingStatus::Pending);
    }

    #[test]
    fn remove_block_refuses_customer_bookings() {
        let ledger = BookingLedger::new();
        let service = service(1);
        let inserted = ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();

        let err = ledger.remove_block(inserted.id).unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        let mut block = booking(&service, monday(), hm(10, 0), hm(11, 0));
        block.status = BookingStatus::Blocked;
        block.customer_id = None;
        let block = ledger.insert_checked(&service, block).unwrap();
        ledger.remove_block(block.id).unwrap();
        assert!(matches!(
            ledger.get(block.id),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn find_due_returns_only_overdue_live_bookings() {
        let ledger = BookingLedger::new();
        let service = service(1);

        let past = ledger
            .insert_checked(&service, booking(&service, monday(), hm(9, 0), hm(10, 0)))
            .unwrap();
        let mut done = booking(&service, monday(), hm(10, 0), hm(11, 0));
        done.status = BookingStatus::Cancelled;
        ledger.insert_checked(&service, done).unwrap();

        let after = monday().and_hms_opt(12, 0, 0).unwrap().and_utc();
        let due = ledger.find_due(after);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, past.id);

        let before = monday().and_hms_opt(8, 0, 0).unwrap().and_utc();
        assert!(ledger.find_due(before).is_empty());
    }
}
