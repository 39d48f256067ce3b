use std::net::SocketAddr;

use pairs::config::{self, GameSettings};
use pairs::http::routes::{self, AppState};
use pairs::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let settings = GameSettings::from_env();
    tracing::info!(?settings, "game settings");
    let state = AppState::new(settings);

    // Periodically forget rooms whose connection died without closing them
    let rooms = state.rooms.clone();
    let max_age = config::session_max_age();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            let pruned = rooms.prune_orphaned(max_age);
            if pruned > 0 {
                tracing::info!(pruned, "pruned orphaned rooms");
            }
        }
    });

    let app = routes::router(state);

    let addr: SocketAddr = config::server_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
