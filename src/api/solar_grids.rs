//! Solar grid endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{error::ApiError, networks::owned_network, response::ApiResponse},
    app::AppState,
    auth::AuthBearer,
    domain::{Caller, PageRequest, Role, SolarGrid},
};

#[derive(Debug, Deserialize, Validate)]
pub struct SolarGridRequest {
    /// Required on update.
    pub id: Option<i64>,
    #[validate(length(min = 3, max = 500))]
    pub name: String,
    pub age: u32,
    /// Required on create.
    pub network_id: Option<i64>,
}

async fn owned_grid(st: &AppState, caller: &Caller, id: i64) -> Result<SolarGrid, ApiError> {
    let grid = st.services.grids.find_by_id(id).await?;
    owned_network(st, caller, grid.network_id).await?;
    Ok(grid)
}

/// GET /api/v1/solar-grid
pub async fn list_grids(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Query(page): Query<PageRequest>,
) -> Result<ApiResponse<Vec<SolarGrid>>, ApiError> {
    caller.require(Role::Admin)?;
    Ok(ApiResponse::page(st.services.grids.find_all(page).await?))
}

/// POST /api/v1/solar-grid
pub async fn create_grid(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Json(mut request): Json<SolarGridRequest>,
) -> Result<ApiResponse<SolarGrid>, ApiError> {
    caller.require(Role::User)?;
    request.name = request.name.trim().to_string();
    request.validate()?;
    let network_id = request
        .network_id
        .ok_or_else(|| ApiError::BadRequest("network_id is required".into()))?;
    owned_network(&st, &caller, network_id).await?;

    let grid = st
        .services
        .grids
        .create(&request.name, request.age, network_id)
        .await?;
    Ok(ApiResponse::created(grid))
}

/// PUT /api/v1/solar-grid
pub async fn update_grid(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Json(mut request): Json<SolarGridRequest>,
) -> Result<ApiResponse<SolarGrid>, ApiError> {
    caller.require(Role::User)?;
    request.name = request.name.trim().to_string();
    request.validate()?;
    let id = request
        .id
        .ok_or_else(|| ApiError::BadRequest("id is required".into()))?;
    owned_grid(&st, &caller, id).await?;

    let grid = st
        .services
        .grids
        .update(id, &request.name, request.age)
        .await?;
    Ok(ApiResponse::success(grid))
}

/// GET /api/v1/solar-grid/:id
pub async fn get_grid(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(id): Path<i64>,
) -> Result<ApiResponse<SolarGrid>, ApiError> {
    caller.require(Role::User)?;
    Ok(ApiResponse::success(owned_grid(&st, &caller, id).await?))
}

/// DELETE /api/v1/solar-grid/:id
pub async fn delete_grid(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    caller.require(Role::User)?;
    owned_grid(&st, &caller, id).await?;
    st.services.grids.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/solar-grid/network/:network_id
pub async fn grids_of_network(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(network_id): Path<i64>,
) -> Result<ApiResponse<Vec<SolarGrid>>, ApiError> {
    caller.require(Role::User)?;
    owned_network(&st, &caller, network_id).await?;
    let grids = st.services.grids.find_by_network_id(network_id).await?;
    Ok(ApiResponse::list(grids))
}

/// GET /api/v1/solar-grid/user/:user_id
pub async fn grids_of_user(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(user_id): Path<i64>,
) -> Result<ApiResponse<Vec<SolarGrid>>, ApiError> {
    caller.require(Role::User)?;
    let owner_id = caller.resolve_owner(Some(user_id))?;
    let grids = st.services.grids.find_by_owner(owner_id).await?;
    Ok(ApiResponse::list(grids))
}
