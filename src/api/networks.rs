//! Network endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{
        error::ApiError,
        response::{ApiResponse, Summarized},
        LoadQuery,
    },
    app::AppState,
    auth::AuthBearer,
    domain::{Caller, Network, PageRequest, Role},
    ingest::IngestionReport,
};

#[derive(Debug, Deserialize, Validate)]
pub struct NetworkRequest {
    #[validate(length(min = 3, max = 50))]
    pub name: String,
    /// Owner of the new network. Defaults to the caller.
    pub id_user: Option<i64>,
}

/// Loads a network the caller may act on.
pub(super) async fn owned_network(
    st: &AppState,
    caller: &Caller,
    id: i64,
) -> Result<Network, ApiError> {
    let network = st.services.networks.find_by_id(id).await?;
    caller.resolve_owner(Some(network.owner_id))?;
    Ok(network)
}

/// GET /api/v1/network
pub async fn list_networks(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Query(page): Query<PageRequest>,
) -> Result<ApiResponse<Vec<Network>>, ApiError> {
    caller.require(Role::Admin)?;
    let page = st.services.networks.find_all(page).await?;
    Ok(ApiResponse::page(page))
}

/// POST /api/v1/network
pub async fn create_network(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Json(mut request): Json<NetworkRequest>,
) -> Result<ApiResponse<Network>, ApiError> {
    caller.require(Role::User)?;
    request.name = request.name.trim().to_string();
    request.validate()?;
    let owner_id = caller.resolve_owner(request.id_user)?;
    let network = st.services.networks.create(&request.name, owner_id).await?;
    Ok(ApiResponse::created(network))
}

/// GET /api/v1/network/:id
pub async fn get_network(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Network>, ApiError> {
    caller.require(Role::User)?;
    Ok(ApiResponse::success(owned_network(&st, &caller, id).await?))
}

/// DELETE /api/v1/network/:id
///
/// Removes the network's grids and their states as well.
pub async fn delete_network(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    caller.require(Role::User)?;
    owned_network(&st, &caller, id).await?;
    st.services.networks.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/network/users/:user_id
pub async fn networks_of_user(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Path(user_id): Path<i64>,
) -> Result<ApiResponse<Vec<Network>>, ApiError> {
    caller.require(Role::User)?;
    let owner_id = caller.resolve_owner(Some(user_id))?;
    let networks = st.services.networks.find_all_by_owner(owner_id).await?;
    Ok(ApiResponse::list(networks))
}

/// POST /api/v1/network/load-file
///
/// Body is a JSON array of loosely keyed `{name, age}` objects.
pub async fn load_file(
    State(st): State<AppState>,
    AuthBearer(caller): AuthBearer,
    Query(query): Query<LoadQuery>,
    body: Bytes,
) -> Result<ApiResponse<Summarized<IngestionReport>>, ApiError> {
    caller.require(Role::User)?;
    let report = st
        .services
        .ingestion
        .ingest_document(&caller, &body, query.elapsed_days)
        .await?;
    Ok(ApiResponse::created(report.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_name_length() {
        let short = NetworkRequest {
            name: "ab".into(),
            id_user: None,
        };
        assert!(short.validate().is_err());

        let ok = NetworkRequest {
            name: "north field".into(),
            id_user: Some(2),
        };
        assert!(ok.validate().is_ok());
    }
}
