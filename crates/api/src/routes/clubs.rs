use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use engine::{
    Address, Club, ClubFilter, CreateClubData, GeoPoint, Role, Sport, UpdateClubData,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::permissions::{require_club_owner, require_role};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListClubsQuery {
    pub sport: Option<Sport>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
    pub sport: Sport,
    pub address: Address,
    pub location: GeoPoint,
    pub description: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Admins may register a club on behalf of another owner.
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateClubRequest {
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

pub async fn list_clubs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListClubsQuery>,
) -> Result<Json<Vec<Club>>, AppError> {
    // The inactive view is for owner/admin dashboards, not discovery.
    let include_inactive = query.include_inactive
        && current
            .0
            .map(|i| matches!(i.role, Role::Owner | Role::Admin))
            .unwrap_or(false);

    let filter = ClubFilter {
        sport: query.sport,
        include_inactive,
    };
    Ok(Json(state.catalog().list_clubs(&filter)))
}

pub async fn get_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
) -> Result<Json<Club>, AppError> {
    Ok(Json(state.catalog().get_club(club_id)?))
}

pub async fn create_club(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateClubRequest>,
) -> Result<(StatusCode, Json<Club>), AppError> {
    let identity = require_role(current, Role::Owner)?;
    let owner_id = if identity.role == Role::Admin {
        req.owner_id.unwrap_or(identity.user_id)
    } else {
        identity.user_id
    };

    let club = state.catalog().create_club(CreateClubData {
        name: req.name,
        sport: req.sport,
        address: req.address,
        location: req.location,
        description: req.description,
        phone: req.phone,
        email: req.email,
        images: req.images,
        amenities: req.amenities,
        owner_id,
    })?;
    Ok((StatusCode::CREATED, Json(club)))
}

pub async fn update_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateClubRequest>,
) -> Result<Json<Club>, AppError> {
    require_club_owner(&state, current, club_id)?;

    let club = state.catalog().update_club(
        club_id,
        UpdateClubData {
            name: req.name,
            sport: req.sport,
            address: req.address,
            location: req.location,
            description: req.description,
            phone: req.phone,
            email: req.email,
            images: req.images,
            amenities: req.amenities,
            is_active: req.is_active,
            is_featured: req.is_featured,
        },
    )?;
    Ok(Json(club))
}

pub async fn delete_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    require_club_owner(&state, current, club_id)?;
    state.catalog().delete_club(club_id)?;
    Ok(StatusCode::NO_CONTENT)
}
