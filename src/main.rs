use anyhow::Result;
use solar_fleet::{api, app::AppState, config::Config, telemetry};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    telemetry::init_tracing(&cfg.logging);

    for user in cfg.auth.unset_tokens() {
        warn!(
            user_id = user.id,
            username = %user.username,
            "user disabled until its token is set"
        );
    }

    let addr = cfg.server.socket_addr()?;
    if cfg.server.host == "0.0.0.0" {
        warn!("server binding to 0.0.0.0, the API will be reachable from the network");
    }

    let state = AppState::new(cfg).await?;
    let app = api::router(state);

    info!(%addr, "starting solar fleet service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
