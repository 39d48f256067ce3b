//! HTTP routes: health, room snapshots, static client, websocket upgrade.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{self, GameSettings};
use crate::room::manager::{RoomError, RoomManager};
use crate::ws;

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RoomManager>,
    pub settings: GameSettings,
}

impl AppState {
    pub fn new(settings: GameSettings) -> Self {
        Self { rooms: Arc::new(RoomManager::new()), settings }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/rooms/:id", get(view_room))
        .route("/ws", get(ws::connection::ws_handler))
        // Serve the browser client from the frontend directory
        .nest_service("/static", ServeDir::new(config::static_dir()))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Redirect { Redirect::to("/static/index.html") }

async fn healthz() -> &'static str { "ok" }

pub async fn view_room(Path(id): Path<String>, State(state): State<AppState>) -> impl IntoResponse {
    match state.rooms.snapshot(&id) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(RoomError::NotFound) => (StatusCode::NOT_FOUND, "room not found").into_response(),
    }
}
