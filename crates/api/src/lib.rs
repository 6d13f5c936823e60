pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/meeting", post(routes::meeting::create))
        .route(
            "/meeting/{meeting_id}/participant",
            get(routes::meeting::participants),
        )
        .route("/chat-state", get(routes::chat::chat_state))
        .route("/disable-chat", post(routes::chat::disable_chat))
        .route(
            "/recording-permission",
            get(routes::recording::get_permission).post(routes::recording::set_permission),
        )
        .route(
            "/request-recording-permission",
            post(routes::recording::request_permission),
        )
        .route(
            "/respond-recording-request",
            post(routes::recording::respond_request),
        );

    let health = Router::new().route("/health", get(health_check));

    let mut router = Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade));

    // Pre-built host / participant / waiting-room pages, when bundled.
    if let Some(ref dir) = state.settings.app.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
