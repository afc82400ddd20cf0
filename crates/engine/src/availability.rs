use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::models::{Booking, Service, TimeSlot};

/// Half-open interval overlap on a single day's clock.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Number of capacity-occupying bookings whose interval overlaps the window.
pub fn occupying_overlaps(bookings: &[Booking], start: NaiveTime, end: NaiveTime) -> usize {
    bookings
        .iter()
        .filter(|b| b.status.occupies_capacity())
        .filter(|b| intervals_overlap(b.start_time, b.end_time, start, end))
        .count()
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn time_at_minute(minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).expect("minute within a day")
}

/// Tile `[opening_time, closing_time)` into consecutive windows of the
/// service's slot duration. A trailing window shorter than the full
/// duration is discarded, so the remainder of an uneven operating window
/// is simply unbookable.
pub fn slot_windows(service: &Service) -> Vec<(NaiveTime, NaiveTime)> {
    let step = service.slot_duration_minutes.max(0) as u32;
    if step == 0 {
        return Vec::new();
    }

    let opening = minute_of_day(service.opening_time);
    let closing = minute_of_day(service.closing_time);

    let mut windows = Vec::new();
    let mut start = opening;
    while start + step <= closing {
        windows.push((time_at_minute(start), time_at_minute(start + step)));
        start += step;
    }
    windows
}

/// Compute the bookable slots for a service on a date, given that day's
/// bookings. Pure: same inputs, same slots; filtering out past dates is a
/// caller concern.
pub fn compute_slots(service: &Service, date: NaiveDate, bookings: &[Booking]) -> Vec<TimeSlot> {
    if !service.bookable_on(date) {
        return Vec::new();
    }

    slot_windows(service)
        .into_iter()
        .map(|(start, end)| TimeSlot {
            start_time: start,
            end_time: end,
            is_available: occupying_overlaps(bookings, start, end) < service.capacity as usize,
        })
        .collect()
}
