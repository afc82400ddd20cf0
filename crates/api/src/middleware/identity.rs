use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use engine::Role;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::{CurrentUser, Identity};
use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity middleware that reads the headers set by the identity provider
/// in front of this service and adds the caller identity to the request
/// extensions for handlers to pick up. Malformed headers are rejected
/// rather than downgraded to anonymous.
pub async fn identity_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let current = match request.headers().get(USER_ID_HEADER) {
        Some(value) => {
            let identity = parse_identity(value, request.headers().get(USER_ROLE_HEADER))?;
            CurrentUser(Some(identity))
        }
        None => CurrentUser(None),
    };
    request.extensions_mut().insert::<CurrentUser>(current);

    Ok(next.run(request).await)
}

fn parse_identity(
    id_value: &HeaderValue,
    role_value: Option<&HeaderValue>,
) -> Result<Identity, AppError> {
    let user_id = id_value
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::Unauthorized("invalid x-user-id header".to_string()))?;

    // "system" is not a role the gateway can assert; it fails parsing here.
    let role = match role_value {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| Role::from_str(s).ok())
            .ok_or_else(|| AppError::Unauthorized("invalid x-user-role header".to_string()))?,
        None => Role::Customer,
    };

    Ok(Identity { user_id, role })
}
