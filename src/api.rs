//! HTTP API endpoints.
//!
//! The page reads its render state from `/api/state` and sends every user
//! action to `/api/action`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::handle_message;
use crate::leaderboard::LeaderboardEntry;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, AppView};

/// Listen address and the directory the page is served from
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            static_dir: "static".to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads `ROADTRIP_ADDR` and `STATIC_DIR`. Blank values fall back to the
    /// defaults, so an empty `STATIC_DIR` never serves the working directory.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| {
            std::env::var(name).ok().and_then(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
        };

        let defaults = Self::default();
        let addr = match non_empty("ROADTRIP_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid ROADTRIP_ADDR {:?}, using {}", raw, defaults.addr);
                defaults.addr
            }),
            None => defaults.addr,
        };

        Self {
            addr,
            static_dir: non_empty("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }
}

/// Full application: API routes, static page fallback, CORS and tracing
pub fn app(state: Arc<AppState>, config: &ServerConfig) -> Router {
    router(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// API routes, without static files or middleware
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/challenges", get(list_challenges))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/action", post(post_action))
        .with_state(state)
}

/// Render state from the current snapshot.
///
/// GET /api/state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<AppView> {
    Json(state.app_view().await)
}

/// Re-fetch and return all challenges.
///
/// GET /api/challenges
///
/// On a store failure the snapshot is left as it was and 502 is returned.
pub async fn list_challenges(State(state): State<Arc<AppState>>) -> Response {
    match state.refresh().await {
        Ok(_) => Json(state.challenge_rows().await).into_response(),
        Err(e) => (StatusCode::BAD_GATEWAY, format!("Store error: {}", e)).into_response(),
    }
}

/// GET /api/leaderboard
pub async fn get_leaderboard(State(state): State<Arc<AppState>>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.get_leaderboard().await)
}

/// Apply one user action.
///
/// POST /api/action
pub async fn post_action(
    State(state): State<Arc<AppState>>,
    Json(msg): Json<ClientMessage>,
) -> Json<ServerMessage> {
    tracing::debug!("Action: {:?}", msg);
    Json(handle_message(msg, &state).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serial_test::serial;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn action(json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/action")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_state() {
        let app = router(Arc::new(AppState::default()));

        let response = app
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["draw"]["state"], "idle");
        assert_eq!(json["leaderboard"][1]["player"], "Marcel");
        assert!(json["challenges"].is_null());
    }

    #[tokio::test]
    async fn test_submit_then_list() {
        let state = Arc::new(AppState::default());

        let response = router(state.clone())
            .oneshot(action(
                r#"{"t": "submit_challenge", "form": {"text": "Jump in a lake", "author": "Paul", "points": 3}}"#,
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["t"], "challenge_submitted");
        assert_eq!(json["form"]["points"], "1");

        let response = router(state)
            .oneshot(Request::get("/api/challenges").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["text"], "Jump in a lake");
        assert_eq!(json[0]["status_label"], "Offen");
    }

    #[tokio::test]
    async fn test_malformed_action() {
        let app = router(Arc::new(AppState::default()));
        let response = app.oneshot(action(r#"{"t": "teleport"}"#)).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        std::env::set_var("ROADTRIP_ADDR", " 127.0.0.1:8080 ");
        std::env::set_var("STATIC_DIR", " public ");
        let config = ServerConfig::from_env();
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.static_dir, "public");

        for blank in ["", "   "] {
            std::env::set_var("ROADTRIP_ADDR", blank);
            std::env::set_var("STATIC_DIR", blank);
            assert_eq!(ServerConfig::from_env(), ServerConfig::default());
        }

        std::env::set_var("ROADTRIP_ADDR", "not an address");
        assert_eq!(ServerConfig::from_env().addr, ServerConfig::default().addr);

        std::env::remove_var("ROADTRIP_ADDR");
        std::env::remove_var("STATIC_DIR");
    }

    #[tokio::test]
    #[serial]
    async fn test_blank_static_dir_hides_working_directory() {
        std::env::set_var("STATIC_DIR", "");
        let config = ServerConfig::from_env();
        std::env::remove_var("STATIC_DIR");

        let app = app(Arc::new(AppState::default()), &config);
        let response = app
            .oneshot(Request::get("/Cargo.toml").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
