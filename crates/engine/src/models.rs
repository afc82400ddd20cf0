use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Bookings shorter than this still bill a full hour.
pub const MIN_BILLED_MINUTES: i64 = 60;

/// Serialize clock times as `HH:MM`, the format the booking surface speaks.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Tennis,
    Padel,
    Squash,
    Badminton,
    Football,
    Basketball,
    Volleyball,
    TableTennis,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Tennis => "tennis",
            Sport::Padel => "padel",
            Sport::Squash => "squash",
            Sport::Badminton => "badminton",
            Sport::Football => "football",
            Sport::Basketball => "basketball",
            Sport::Volleyball => "volleyball",
            Sport::TableTennis => "table_tennis",
        }
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tennis" => Ok(Sport::Tennis),
            "padel" => Ok(Sport::Padel),
            "squash" => Ok(Sport::Squash),
            "badminton" => Ok(Sport::Badminton),
            "football" => Ok(Sport::Football),
            "basketball" => Ok(Sport::Basketball),
            "volleyball" => Ok(Sport::Volleyball),
            "table_tennis" => Ok(Sport::TableTennis),
            _ => Err(format!("Unknown sport: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monday" => Ok(DayOfWeek::Monday),
            "tuesday" => Ok(DayOfWeek::Tuesday),
            "wednesday" => Ok(DayOfWeek::Wednesday),
            "thursday" => Ok(DayOfWeek::Thursday),
            "friday" => Ok(DayOfWeek::Friday),
            "saturday" => Ok(DayOfWeek::Saturday),
            "sunday" => Ok(DayOfWeek::Sunday),
            _ => Err(format!("Unknown day of week: {}", s)),
        }
    }
}

/// Roles the identity provider can assert for a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Owner,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            "customer" => Ok(Role::Customer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Who is asking for a mutation. `System` is reserved for in-process
/// services (the expiry sweeper); it cannot be asserted through the HTTP
/// identity headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    System,
    User { id: Uuid, role: Role },
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::System => None,
            Actor::User { id, .. } => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::User { role: Role::Admin, .. })
    }

    /// Admins manage every club; owners only their own.
    pub fn manages_club(&self, club: &Club) -> bool {
        match self {
            Actor::System => false,
            Actor::User { id, role } => match role {
                Role::Admin => true,
                Role::Owner => club.owner_id == *id,
                Role::Customer => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub sport: Sport,
    pub address: Address,
    pub location: GeoPoint,
    pub description: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    /// Maintained by the review subsystem; served as-is here.
    pub average_rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_deleted: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub sport_type: Sport,
    pub hourly_price_cents: i32,
    /// Concurrent bookable units for the same time window.
    pub capacity: i32,
    pub description: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub available_days: Vec<DayOfWeek>,
    #[serde(with = "hhmm")]
    pub opening_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub closing_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn bookable_on(&self, date: NaiveDate) -> bool {
        self.available_days.contains(&DayOfWeek::from(date.weekday()))
    }

    /// Price in cents for a booking of the given duration. Durations under
    /// an hour bill the full hour; longer ones bill pro rata, truncating
    /// fractional cents.
    pub fn price_for_duration(&self, minutes: i64) -> i32 {
        let billed = minutes.max(MIN_BILLED_MINUTES);
        (self.hourly_price_cents as i64 * billed / 60) as i32
    }
}

/// A bookable window derived from a service's operating hours. Computed
/// fresh on every availability query, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
    Expired,
    /// Owner-held slot with no customer; occupies capacity like a booking.
    Blocked,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Expired => "expired",
            BookingStatus::Blocked => "blocked",
        }
    }

    /// Terminal statuses accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected
                | BookingStatus::Cancelled
                | BookingStatus::Completed
                | BookingStatus::Expired
        )
    }

    /// Statuses that count against a service's capacity.
    pub fn occupies_capacity(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Blocked
        )
    }

    pub fn all() -> [BookingStatus; 7] {
        [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
            BookingStatus::Expired,
            BookingStatus::Blocked,
        ]
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            "expired" => Ok(BookingStatus::Expired),
            "blocked" => Ok(BookingStatus::Blocked),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// `None` exactly when this record is an owner block.
    pub customer_id: Option<Uuid>,
    pub club_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub total_price_cents: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// When the booked window is over, on the club's calendar day.
    pub fn ends_at(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.end_time)
    }
}
