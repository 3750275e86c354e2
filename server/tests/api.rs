//! REST-API ueber `tower::ServiceExt::oneshot`

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use holler_auth::PasswortHasher;
use holler_db::SqliteDb;
use holler_server::{config::ServerConfig, http, zustand_mit_hasher};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app_mit_static(static_verzeichnis: &str) -> Router {
    let db = Arc::new(SqliteDb::in_memory().await.expect("In-Memory DB"));
    let (state, _cleanup) = zustand_mit_hasher(
        db,
        &ServerConfig::default(),
        PasswortHasher::mit_parametern(1024, 1, 1),
    );
    http::router(state, static_verzeichnis)
}

async fn app() -> Router {
    app_mit_static("static").await
}

async fn post(app: &Router, pfad: &str, body: &str, cookie: Option<&str>) -> Response {
    let mut req = Request::builder()
        .method("POST")
        .uri(pfad)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    app.clone()
        .oneshot(req.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn get(app: &Router, pfad: &str, cookie: Option<&str>) -> Response {
    let mut req = Request::builder().uri(pfad);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `holler-session=<token>` aus dem Set-Cookie-Header
fn session_cookie(resp: &Response) -> String {
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie erwartet")
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    set_cookie.split(';').next().unwrap().to_string()
}

fn zugang(name: &str, passwort: &str) -> String {
    json!({ "username": name, "password": passwort }).to_string()
}

#[tokio::test]
async fn registrieren_anmelden_session_abmelden() {
    let app = app().await;

    let resp = post(&app, "/api/register", &zugang("alice", "geheim"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let registriert = json_body(resp).await;
    assert_eq!(registriert["username"], "alice");
    assert!(registriert["id"].is_string());
    assert!(registriert.get("password_hash").is_none());

    let resp = post(&app, "/api/login", &zugang("alice", "geheim"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp);
    assert!(cookie.starts_with("holler-session="));
    assert_eq!(json_body(resp).await["id"], registriert["id"]);

    let resp = get(&app, "/api/session", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["username"], "alice");

    let resp = post(&app, "/api/logout", "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let geloescht = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(geloescht.starts_with("holler-session=;"), "{geloescht}");
    assert!(geloescht.contains("Max-Age=0"));

    let resp = get(&app, "/api/session", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn doppelter_benutzername_ist_konflikt() {
    let app = app().await;
    post(&app, "/api/register", &zugang("bob", "a"), None).await;

    let resp = post(&app, "/api/register", &zugang("bob", "b"), None).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], 409);
    assert!(body["error"]["message"].as_str().unwrap().contains("bob"));
}

#[tokio::test]
async fn ungueltige_eingaben_sind_400() {
    let app = app().await;

    let bodies = [
        "{kein json".to_string(),
        r#"{"username":"x"}"#.to_string(),
        zugang("", "pw"),
        zugang("carol", ""),
    ];
    for body in &bodies {
        let resp = post(&app, "/api/register", body, None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "Body: {body}");
        assert_eq!(json_body(resp).await["error"]["code"], 400);
    }
}

#[tokio::test]
async fn falsches_passwort_ist_401() {
    let app = app().await;
    post(&app, "/api/register", &zugang("dave", "richtig"), None).await;

    let resp = post(&app, "/api/login", &zugang("dave", "falsch"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    let resp = post(&app, "/api/login", &zugang("niemand", "egal"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_ohne_cookie_ist_401() {
    let app = app().await;
    assert_eq!(get(&app, "/api/session", None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        get(&app, "/api/session", Some("holler-session=erfunden")).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn statische_dateien() {
    let verzeichnis = std::env::temp_dir().join(format!("holler-static-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&verzeichnis).unwrap();
    std::fs::write(verzeichnis.join("index.html"), "<h1>Holler</h1>").unwrap();

    let app = app_mit_static(verzeichnis.to_str().unwrap()).await;

    let resp = get(&app, "/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>Holler</h1>");

    assert_eq!(get(&app, "/fehlt.js", None).await.status(), StatusCode::NOT_FOUND);
    std::fs::remove_dir_all(&verzeichnis).ok();
}
