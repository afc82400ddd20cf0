use chrono::{NaiveTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::events::EventHub;
use crate::models::{Address, Club, DayOfWeek, GeoPoint, Service, Sport};

#[derive(Debug, Clone, Default)]
pub struct ClubFilter {
    pub sport: Option<Sport>,
    /// Owner/admin view; discovery listings keep this off.
    pub include_inactive: bool,
}

#[derive(Debug, Clone)]
pub struct CreateClubData {
    pub name: String,
    pub sport: Sport,
    pub address: Address,
    pub location: GeoPoint,
    pub description: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateClubData {
    pub name: Option<String>,
    pub sport: Option<Sport>,
    pub address: Option<Address>,
    pub location: Option<GeoPoint>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CreateServiceData {
    pub club_id: Uuid,
    pub name: String,
    pub sport_type: Sport,
    pub hourly_price_cents: i32,
    pub capacity: i32,
    pub description: String,
    pub images: Vec<String>,
    pub available_days: Vec<DayOfWeek>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub slot_duration_minutes: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateServiceData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hourly_price_cents: Option<i32>,
    pub capacity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub available_days: Option<Vec<DayOfWeek>>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub slot_duration_minutes: Option<i32>,
}

#[derive(Default)]
struct CatalogInner {
    clubs: HashMap<Uuid, Club>,
    services: HashMap<Uuid, Service>,
}

/// Authoritative club/service reference data. One store instance is the
/// single source of truth; writes are visible to the next read, and every
/// mutation emits a cache-invalidation signal for downstream caches.
pub struct CatalogStore {
    inner: RwLock<CatalogInner>,
    events: EventHub,
}

impl CatalogStore {
    pub fn new(events: EventHub) -> Self {
        Self {
            inner: RwLock::new(CatalogInner::default()),
            events,
        }
    }

    pub fn create_club(&self, data: CreateClubData) -> EngineResult<Club> {
        validate_club_fields(&data.name, &data.address, &data.location, &data.description)?;

        let now = Utc::now();
        let mut club = Club {
            id: Uuid::new_v4(),
            name: data.name,
            sport: data.sport,
            address: data.address,
            location: data.location,
            description: data.description,
            phone: data.phone,
            email: data.email,
            images: data.images,
            amenities: data.amenities,
            average_rating: 0.0,
            review_count: 0,
            is_active: true,
            is_featured: false,
            is_deleted: false,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        normalize_club(&mut club);

        self.inner.write().clubs.insert(club.id, club.clone());
        self.events.invalidate(club.id, None);
        Ok(club)
    }

    /// Discovery read: soft-deleted clubs are invisible here.
    pub fn get_club(&self, club_id: Uuid) -> EngineResult<Club> {
        let club = self.get_club_any(club_id)?;
        if club.is_deleted {
            return Err(EngineError::not_found("club", club_id));
        }
        Ok(club)
    }

    /// Includes soft-deleted clubs; used for bookkeeping on historical
    /// bookings, never for discovery.
    pub fn get_club_any(&self, club_id: Uuid) -> EngineResult<Club> {
        self.inner
            .read()
            .clubs
            .get(&club_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("club", club_id))
    }

    pub fn list_clubs(&self, filter: &ClubFilter) -> Vec<Club> {
        let inner = self.inner.read();
        let mut clubs: Vec<Club> = inner
            .clubs
            .values()
            .filter(|c| !c.is_deleted)
            .filter(|c| filter.include_inactive || c.is_active)
            .filter(|c| filter.sport.map(|s| c.sport == s).unwrap_or(true))
            .cloned()
            .collect();
        clubs.sort_by(|a, b| a.name.cmp(&b.name));
        clubs
    }

    /// Partial update: unspecified fields keep their previous value. The
    /// patch is applied to a copy and committed only if the result still
    /// validates, so a bad patch cannot half-apply.
    pub fn update_club(&self, club_id: Uuid, patch: UpdateClubData) -> EngineResult<Club> {
        let mut inner = self.inner.write();
        let current = inner
            .clubs
            .get(&club_id)
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| EngineError::not_found("club", club_id))?;

        let mut club = current.clone();
        if let Some(name) = patch.name {
            club.name = name;
        }
        if let Some(sport) = patch.sport {
            club.sport = sport;
        }
        if let Some(address) = patch.address {
            club.address = address;
        }
        if let Some(location) = patch.location {
            club.location = location;
        }
        if let Some(description) = patch.description {
            club.description = description;
        }
        if let Some(phone) = patch.phone {
            club.phone = Some(phone);
        }
        if let Some(email) = patch.email {
            club.email = Some(email);
        }
        if let Some(images) = patch.images {
            club.images = images;
        }
        if let Some(amenities) = patch.amenities {
            club.amenities = amenities;
        }
        if let Some(is_active) = patch.is_active {
            club.is_active = is_active;
        }
        if let Some(is_featured) = patch.is_featured {
            club.is_featured = is_featured;
        }

        validate_club_fields(&club.name, &club.address, &club.location, &club.description)?;
        normalize_club(&mut club);
        club.updated_at = Utc::now();
        inner.clubs.insert(club_id, club.clone());
        drop(inner);

        self.events.invalidate(club_id, None);
        Ok(club)
    }

    /// Soft delete. Owned services are deactivated in the same write so the
    /// club cannot leave bookable orphans behind.
    pub fn delete_club(&self, club_id: Uuid) -> EngineResult<()> {
        let mut inner = self.inner.write();
        let club = inner
            .clubs
            .get_mut(&club_id)
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| EngineError::not_found("club", club_id))?;

        club.is_deleted = true;
        club.is_active = false;
        club.updated_at = Utc::now();

        for service in inner.services.values_mut() {
            if service.club_id == club_id {
                service.is_active = false;
                service.updated_at = Utc::now();
            }
        }
        drop(inner);

        self.events.invalidate(club_id, None);
        Ok(())
    }

    pub fn create_service(&self, data: CreateServiceData) -> EngineResult<Service> {
        // The owning club must exist and not be deleted.
        self.get_club(data.club_id)?;
        validate_service_fields(
            data.hourly_price_cents,
            data.capacity,
            data.opening_time,
            data.closing_time,
            data.slot_duration_minutes,
            &data.available_days,
        )?;

        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            club_id: data.club_id,
            name: data.name.trim().to_string(),
            sport_type: data.sport_type,
            hourly_price_cents: data.hourly_price_cents,
            capacity: data.capacity,
            description: data.description,
            images: data.images,
            is_active: true,
            available_days: data.available_days,
            opening_time: data.opening_time,
            closing_time: data.closing_time,
            slot_duration_minutes: data.slot_duration_minutes,
            created_at: now,
            updated_at: now,
        };

        self.inner.write().services.insert(service.id, service.clone());
        self.events.invalidate(service.club_id, Some(service.id));
        Ok(service)
    }

    pub fn get_service(&self, service_id: Uuid) -> EngineResult<Service> {
        self.inner
            .read()
            .services
            .get(&service_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("service", service_id))
    }

    pub fn list_services_for_club(&self, club_id: Uuid) -> EngineResult<Vec<Service>> {
        self.get_club(club_id)?;
        let inner = self.inner.read();
        let mut services: Vec<Service> = inner
            .services
            .values()
            .filter(|s| s.club_id == club_id)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    pub fn update_service(&self, service_id: Uuid, patch: UpdateServiceData) -> EngineResult<Service> {
        let mut inner = self.inner.write();
        let current = inner
            .services
            .get(&service_id)
            .ok_or_else(|| EngineError::not_found("service", service_id))?;

        let mut service = current.clone();
        if let Some(name) = patch.name {
            service.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            service.description = description;
        }
        if let Some(price) = patch.hourly_price_cents {
            service.hourly_price_cents = price;
        }
        if let Some(capacity) = patch.capacity {
            service.capacity = capacity;
        }
        if let Some(images) = patch.images {
            service.images = images;
        }
        if let Some(is_active) = patch.is_active {
            service.is_active = is_active;
        }
        if let Some(days) = patch.available_days {
            service.available_days = days;
        }
        if let Some(opening) = patch.opening_time {
            service.opening_time = opening;
        }
        if let Some(closing) = patch.closing_time {
            service.closing_time = closing;
        }
        if let Some(slot) = patch.slot_duration_minutes {
            service.slot_duration_minutes = slot;
        }

        validate_service_fields(
            service.hourly_price_cents,
            service.capacity,
            service.opening_time,
            service.closing_time,
            service.slot_duration_minutes,
            &service.available_days,
        )?;
        service.updated_at = Utc::now();
        inner.services.insert(service_id, service.clone());
        drop(inner);

        self.events.invalidate(service.club_id, Some(service_id));
        Ok(service)
    }
}

fn validate_club_fields(
    name: &str,
    address: &Address,
    location: &GeoPoint,
    description: &str,
) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::validation("club name is required"));
    }
    if address.street.trim().is_empty() || address.city.trim().is_empty() {
        return Err(EngineError::validation("club address is required"));
    }
    if description.trim().is_empty() {
        return Err(EngineError::validation("club description is required"));
    }
    if !location.is_valid() {
        return Err(EngineError::validation(
            "club location must be a valid longitude/latitude pair",
        ));
    }
    Ok(())
}

fn validate_service_fields(
    hourly_price_cents: i32,
    capacity: i32,
    opening_time: NaiveTime,
    closing_time: NaiveTime,
    slot_duration_minutes: i32,
    available_days: &[DayOfWeek],
) -> EngineResult<()> {
    if hourly_price_cents <= 0 {
        return Err(EngineError::validation("hourly price must be positive"));
    }
    if capacity <= 0 {
        return Err(EngineError::validation("capacity must be positive"));
    }
    if opening_time >= closing_time {
        return Err(EngineError::validation(
            "opening time must be before closing time",
        ));
    }
    if slot_duration_minutes <= 0 {
        return Err(EngineError::validation("slot duration must be positive"));
    }
    if available_days.is_empty() {
        return Err(EngineError::validation(
            "service must be available on at least one day",
        ));
    }
    Ok(())
}

/// The single coalescing point for optional club fields. Every write path
/// runs through here, so read endpoints never re-apply defaults.
fn normalize_club(club: &mut Club) {
    club.name = club.name.trim().to_string();
    club.description = club.description.trim().to_string();
    club.images.retain(|url| !url.trim().is_empty());
    club.amenities = club
        .amenities
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    club.amenities.sort();
    club.amenities.dedup();
    if let Some(phone) = &club.phone {
        if phone.trim().is_empty() {
            club.phone = None;
        }
    }
    if let Some(email) = &club.email {
        if email.trim().is_empty() {
            club.email = None;
        }
    }
}
