pub mod availability;
pub mod catalog;
pub mod error;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod models;

pub use catalog::{
    CatalogStore, ClubFilter, CreateClubData, CreateServiceData, UpdateClubData, UpdateServiceData,
};
pub use error::{EngineError, EngineResult};
pub use events::{EngineEvent, EventHub, LifecycleKind};
pub use ledger::BookingLedger;
pub use lifecycle::{CreateBlockParams, CreateBookingParams};
pub use models::{
    Actor, Address, Booking, BookingStatus, Club, DayOfWeek, GeoPoint, Role, Service, Sport,
    TimeSlot,
};
