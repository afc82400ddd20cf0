use chrono::NaiveTime;
use engine::{Address, CreateClubData, CreateServiceData, DayOfWeek, GeoPoint, Sport};
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

/// Populate a small demo catalog so the API is explorable without a real
/// identity provider in front of it. The generated owner ids are logged;
/// pass one as `x-user-id` with `x-user-role: owner` to act as that club.
pub fn seed_demo_catalog(state: &AppState) -> anyhow::Result<()> {
    let weekdays = vec![
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
    ];

    let padel_owner = Uuid::new_v4();
    let padel_club = state.catalog().create_club(CreateClubData {
        name: "Riverside Padel Centre".into(),
        sport: Sport::Padel,
        address: Address {
            street: "12 Quay Street".into(),
            city: "Ghent".into(),
            state: "East Flanders".into(),
            postal_code: "9000".into(),
        },
        location: GeoPoint {
            longitude: 3.7174,
            latitude: 51.0543,
        },
        description: "Four indoor padel courts by the river, open all week.".into(),
        phone: Some("+32 9 555 01 23".into()),
        email: Some("hello@riversidepadel.example".into()),
        images: vec![],
        amenities: vec!["parking".into(), "showers".into(), "bar".into()],
        owner_id: padel_owner,
    })?;

    for court in ["Court 1", "Court 2"] {
        state.catalog().create_service(CreateServiceData {
            club_id: padel_club.id,
            name: court.into(),
            sport_type: Sport::Padel,
            hourly_price_cents: 2400,
            capacity: 1,
            description: "Indoor glass court".into(),
            images: vec![],
            available_days: weekdays.clone(),
            opening_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).expect("valid time"),
            slot_duration_minutes: 60,
        })?;
    }

    let tennis_owner = Uuid::new_v4();
    let tennis_club = state.catalog().create_club(CreateClubData {
        name: "Baseline Tennis Club".into(),
        sport: Sport::Tennis,
        address: Address {
            street: "3 Court Lane".into(),
            city: "Leeds".into(),
            state: "West Yorkshire".into(),
            postal_code: "LS1 4AB".into(),
        },
        location: GeoPoint {
            longitude: -1.5491,
            latitude: 53.8008,
        },
        description: "Six outdoor clay courts and a clubhouse.".into(),
        phone: None,
        email: Some("bookings@baselinetennis.example".into()),
        images: vec![],
        amenities: vec!["parking".into(), "pro shop".into()],
        owner_id: tennis_owner,
    })?;

    state.catalog().create_service(CreateServiceData {
        club_id: tennis_club.id,
        name: "Clay Court A".into(),
        sport_type: Sport::Tennis,
        hourly_price_cents: 1800,
        capacity: 2,
        description: "Floodlit clay court".into(),
        images: vec![],
        available_days: vec![
            DayOfWeek::Monday,
            DayOfWeek::Wednesday,
            DayOfWeek::Friday,
            DayOfWeek::Saturday,
            DayOfWeek::Sunday,
        ],
        opening_time: NaiveTime::from_hms_opt(8, 0, 0).expect("valid time"),
        closing_time: NaiveTime::from_hms_opt(20, 0, 0).expect("valid time"),
        slot_duration_minutes: 30,
    })?;

    info!(
        "Seeded demo catalog: {} (owner {}), {} (owner {})",
        padel_club.name, padel_owner, tennis_club.name, tennis_owner
    );
    Ok(())
}
