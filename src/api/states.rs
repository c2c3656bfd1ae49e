//! Grid state endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    api::{
        error::ApiError,
        networks::owned_network,
        response::{ApiResponse, Summarized},
    },
    app::AppState,
    auth::AuthBearer,
    domain::{Caller, PageRequest, Role, State},
    ingest::HistoryReport,
};

#[derive(Debug, Deserialize)]
pub struct StateRequest {
    /// Required on update.
    pub id: Option<i64>,
    pub age: u32,
    /// Required on create.
    pub grid_id: Option<i64>,
}

async fn check_grid_access(st: &AppState, caller: &Caller, grid_id: i64) -> Result<(), ApiError> {
    let grid = st.services.grids.find_by_id(grid_id).await?;
    owned_network(st, caller, grid.network_id).await?;
    Ok(())
}

async fn owned_state(st: &AppState, caller: &Caller, id: i64) -> Result<State, ApiError> {
    let state = st.services.states.find_by_id(id).await?;
    check_grid_access(st, caller, state.grid_id).await?;
    Ok(state)
}

/// GET /api/v1/state
pub async fn list_states(
    AxumState(st): AxumState<AppState>,
    AuthBearer(caller): AuthBearer,
    Query(page): Query<PageRequest>,
) -> Result<ApiResponse<Vec<State>>, ApiError> {
    caller.require(Role::Admin)?;
    Ok(ApiResponse::page(st.services.states.find_all(page).await?))
}

/// POST /api/v1/state
pub async fn create_state(
    AxumState(st): AxumState<AppState>,
    AuthBearer(caller): AuthBearer,
    Json(request): Json<StateRequest>,
) -> Result<ApiResponse<State>, ApiError> {
    caller.require(Role::User)?;
    let grid_id = request
        .grid_id
        .ok_or_else(|| ApiError::BadRequest("grid_id is required".into()))?;
    check_grid_access(&st, &caller, grid_id).await?;

    let state = st.services.states.create(grid_id, request.age).await?;
    Ok(ApiResponse::created(state))
}

/// PUT /api/v1/state
pub async fn update_state(
    AxumState(st): AxumState<AppState>,
    AuthBearer(caller): AuthBearer,
    Json(request): Json<StateRequest>,
) -> Result<ApiResponse<State>, ApiError> {
    caller.require(Role::User)?;
    let id = request
        .id
        .ok_or_else(|| ApiError::BadRequest("id is required".into()))?;
    owned_state(&st, &caller, id).await?;

    let state = st.services.states.update(id, request.age).await?;
    Ok(ApiResponse::success(state))
}

/// GET /api/v1/state/:id
pub async fn get_state(
    AxumState(st): AxumState<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(id): Path<i64>,
) -> Result<ApiResponse<State>, ApiError> {
    caller.require(Role::User)?;
    Ok(ApiResponse::success(owned_state(&st, &caller, id).await?))
}

/// DELETE /api/v1/state/:id
pub async fn delete_state(
    AxumState(st): AxumState<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    caller.require(Role::User)?;
    owned_state(&st, &caller, id).await?;
    st.services.states.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/state/receive-file
///
/// Records one state per measurement, creating grids the caller does not have yet.
pub async fn receive_file(
    AxumState(st): AxumState<AppState>,
    AuthBearer(caller): AuthBearer,
    body: Bytes,
) -> Result<ApiResponse<Summarized<HistoryReport>>, ApiError> {
    caller.require(Role::User)?;
    let report = st.services.history.record_document(&caller, &body).await?;
    Ok(ApiResponse::created(report.into()))
}
