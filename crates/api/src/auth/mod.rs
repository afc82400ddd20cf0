pub mod permissions;

use engine::{Actor, Role};
use uuid::Uuid;

/// Caller identity as asserted by the upstream identity provider. The
/// engine trusts these values; authentication itself happens before
/// requests reach this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor::User {
            id: self.user_id,
            role: self.role,
        }
    }
}

/// Present on every request after the identity middleware has run;
/// `None` for anonymous callers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Option<Identity>);
