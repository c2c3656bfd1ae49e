use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    api::{health, networks, simulator, solar_grids, states},
    app::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/solar-simulator/load", post(simulator::load))
        .route("/solar-simulator/output/:days", get(simulator::output_after))
        .route("/solar-simulator/network/:days", get(simulator::network_after))
        .route(
            "/network",
            get(networks::list_networks).post(networks::create_network),
        )
        .route("/network/load-file", post(networks::load_file))
        .route(
            "/network/:id",
            get(networks::get_network).delete(networks::delete_network),
        )
        .route("/network/users/:user_id", get(networks::networks_of_user))
        .route(
            "/solar-grid",
            get(solar_grids::list_grids)
                .post(solar_grids::create_grid)
                .put(solar_grids::update_grid),
        )
        .route(
            "/solar-grid/:id",
            get(solar_grids::get_grid).delete(solar_grids::delete_grid),
        )
        .route(
            "/solar-grid/network/:network_id",
            get(solar_grids::grids_of_network),
        )
        .route("/solar-grid/user/:user_id", get(solar_grids::grids_of_user))
        .route(
            "/state",
            get(states::list_states)
                .post(states::create_state)
                .put(states::update_state),
        )
        .route("/state/receive-file", post(states::receive_file))
        .route(
            "/state/:id",
            get(states::get_state).delete(states::delete_state),
        )
        .with_state(state)
}
