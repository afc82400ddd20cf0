pub mod availability;
pub mod blocks;
pub mod bookings;
pub mod clubs;
pub mod events;
pub mod services;
