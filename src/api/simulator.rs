//! Solar simulator endpoints: typed batch load and projections for the caller.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::{
        error::ApiError,
        response::{ApiResponse, Summarized},
        LoadQuery,
    },
    app::AppState,
    auth::AuthBearer,
    domain::Role,
    ingest::{GridDescriptor, IngestionReport},
    simulation::ProjectedGrid,
};

#[derive(Debug, Serialize)]
pub struct OutputResponse {
    pub owner_id: i64,
    pub days: u32,
    /// kW
    pub total_output: f64,
}

/// POST /api/v1/solar-simulator/load
pub async fn load(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Query(query): Query<LoadQuery>,
    Json(batch): Json<Vec<GridDescriptor>>,
) -> Result<ApiResponse<Summarized<IngestionReport>>, ApiError> {
    caller.require(Role::User)?;
    let report = st
        .services
        .ingestion
        .ingest_descriptors(&caller, batch, query.elapsed_days)
        .await?;
    Ok(ApiResponse::created(report.into()))
}

/// GET /api/v1/solar-simulator/output/:days
pub async fn output_after(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(days): Path<u32>,
) -> Result<ApiResponse<OutputResponse>, ApiError> {
    caller.require(Role::User)?;
    let total_output = st
        .services
        .simulation
        .total_output_after(caller.id, days)
        .await?;
    Ok(ApiResponse::success(OutputResponse {
        owner_id: caller.id,
        days,
        total_output,
    }))
}

/// GET /api/v1/solar-simulator/network/:days
pub async fn network_after(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(days): Path<u32>,
) -> Result<ApiResponse<Vec<ProjectedGrid>>, ApiError> {
    caller.require(Role::User)?;
    let grids = st
        .services
        .simulation
        .network_state_after(caller.id, days)
        .await?;
    Ok(ApiResponse::list(grids))
}
