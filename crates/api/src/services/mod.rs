mod expiry_service;
mod notification_service;

pub use expiry_service::spawn_expiry_service;
pub use notification_service::{spawn_notification_service, Notification};
