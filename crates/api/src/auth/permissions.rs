use engine::Role;
use uuid::Uuid;

use crate::auth::{CurrentUser, Identity};
use crate::error::AppError;
use crate::state::AppState;

pub fn require_identity(current: CurrentUser) -> Result<Identity, AppError> {
    current.0.ok_or_else(|| {
        AppError::Unauthorized("you must be signed in to perform this action".to_string())
    })
}

/// Check that the caller holds at least the required role.
pub fn require_role(current: CurrentUser, required: Role) -> Result<Identity, AppError> {
    let identity = require_identity(current)?;
    if !has_required_role(identity.role, required) {
        return Err(AppError::Forbidden(format!(
            "access denied: {} privileges required, your current role is {}",
            required.as_str(),
            identity.role.as_str()
        )));
    }
    Ok(identity)
}

/// Club-scoped check: admins manage any club, owners only their own.
/// Soft-deleted clubs still resolve here so owners can manage their
/// booking history.
pub fn require_club_owner(
    state: &AppState,
    current: CurrentUser,
    club_id: Uuid,
) -> Result<Identity, AppError> {
    let identity = require_role(current, Role::Owner)?;
    if identity.role == Role::Admin {
        return Ok(identity);
    }

    let club = state.catalog().get_club_any(club_id)?;
    if club.owner_id != identity.user_id {
        return Err(AppError::Forbidden(
            "access denied: you do not manage this club".to_string(),
        ));
    }
    Ok(identity)
}

fn has_required_role(role: Role, required: Role) -> bool {
    match required {
        Role::Admin => role == Role::Admin,
        // Admin has owner permissions
        Role::Owner => matches!(role, Role::Owner | Role::Admin),
        Role::Customer => true,
    }
}
