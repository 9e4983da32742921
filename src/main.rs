use axum::{
    extract::State,
    http::{StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use opsdesk_api::error::ApiError;
use opsdesk_api::handlers::{admin, auth, boards};
use opsdesk_api::middleware::{gate_middleware, session_middleware};
use opsdesk_api::routes::{route_kind, RouteKind};
use opsdesk_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = opsdesk_api::config::config().clone();
    tracing::info!("Starting opsdesk API in {:?} mode", config.environment);

    let state = AppState::from_config(config);
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("OPSDESK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 opsdesk API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(board_routes())
        .merge(admin_routes())
        // Paths without a handler (portal page prefixes included) still pass
        // the session/gate layers before landing here
        .fallback(fallback)
        // Layers run bottom-up on requests: session resolution first, then
        // the authorization gate, before any handler
        .layer(middleware::from_fn(gate_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        // Token acquisition (public tier)
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/google", get(auth::google_start))
        .route("/api/auth/google/callback", get(auth::google_callback))
        .route("/api/auth/logout", post(auth::logout))
        // Session introspection (authenticated tier)
        .route("/api/auth/me", get(auth::me))
}

fn board_routes() -> Router<AppState> {
    Router::new()
        .route("/api/boards", get(boards::list).post(boards::create))
        .route(
            "/api/boards/:id",
            get(boards::detail).put(boards::update).delete(boards::delete),
        )
        .route("/api/boards/:id/members", post(boards::add_member))
        .route(
            "/api/boards/:id/members/:user_id",
            put(boards::update_member).delete(boards::remove_member),
        )
        .route("/api/boards/:id/columns", post(boards::create_column))
        .route("/api/boards/:id/columns/reorder", put(boards::reorder_columns))
        .route("/api/boards/:id/activity", get(boards::activity))
        .route("/api/boards/:id/cards", post(boards::create_card))
        .route("/api/cards/:id/move", patch(boards::move_card))
        .route("/api/cards/:id", delete(boards::delete_card))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(admin::list_users).post(admin::create_user))
        .route("/api/admin/users/:id/role", put(admin::update_role))
        .route("/api/admin/users/:id/revoke-sessions", post(admin::revoke_sessions))
        .route("/api/admin/stats", get(admin::stats))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "opsdesk API",
            "version": version,
            "description": "Session, authorization and board-permission backend for the opsdesk portal",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/login, /api/auth/register, /api/auth/google, /api/auth/logout (public - token acquisition)",
                "me": "/api/auth/me (protected)",
                "boards": "/api/boards[/:id]... (protected)",
                "cards": "/api/cards/:id... (protected)",
                "admin": "/api/admin/* (ADMIN only)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

/// Unrouted paths that survived the gate. API paths answer a JSON 404; page
/// paths are served by the portal frontend, not this process.
async fn fallback(uri: Uri) -> axum::response::Response {
    match route_kind(uri.path()) {
        RouteKind::Api => ApiError::not_found("Unknown endpoint").into_response(),
        RouteKind::Page => StatusCode::NOT_FOUND.into_response(),
    }
}
