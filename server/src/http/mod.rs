//! HTTP-Oberflaeche: REST-API, WebSocket-Endpunkt und statische Dateien

pub mod auth;
pub mod ws;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use holler_auth::AuthService;
use holler_db::SqliteDb;
use holler_relay::HubKontext;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Axum-State fuer alle Handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<SqliteDb>>,
    pub hub: Arc<HubKontext>,
}

/// Erstellt den vollstaendigen Router
///
/// Alles was keine API- oder WebSocket-Route ist, wird aus
/// `static_verzeichnis` ausgeliefert.
pub fn router(state: AppState, static_verzeichnis: &str) -> Router {
    Router::new()
        .route("/api/register", post(auth::registrieren))
        .route("/api/login", post(auth::anmelden))
        .route("/api/session", get(auth::session))
        .route("/api/logout", post(auth::abmelden))
        .route("/ws", get(ws::ws_upgrade))
        .fallback_service(ServeDir::new(static_verzeichnis))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
