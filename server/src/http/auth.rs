//! REST-Handler fuer Registrierung, Login und Session

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use holler_db::models::BenutzerRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::http::AppState;

/// Name des Session-Cookies
pub const SESSION_COOKIE: &str = "holler-session";

#[derive(Debug, Deserialize)]
pub struct Anmeldedaten {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BenutzerAntwort {
    pub id: Uuid,
    pub username: String,
}

impl From<&BenutzerRecord> for BenutzerAntwort {
    fn from(b: &BenutzerRecord) -> Self {
        Self {
            id: b.id,
            username: b.username.clone(),
        }
    }
}

/// POST /api/register
pub async fn registrieren(
    State(state): State<AppState>,
    body: Result<Json<Anmeldedaten>, JsonRejection>,
) -> ApiResult<Json<BenutzerAntwort>> {
    let Json(daten) = body?;
    let benutzer = state.auth.registrieren(&daten.username, &daten.password).await?;
    Ok(Json(BenutzerAntwort::from(&benutzer)))
}

/// POST /api/login – setzt das Session-Cookie
pub async fn anmelden(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<Anmeldedaten>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<BenutzerAntwort>)> {
    let Json(daten) = body?;
    let (benutzer, session) = state.auth.anmelden(&daten.username, &daten.password).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .http_only(true)
        .path("/");
    Ok((jar.add(cookie), Json(BenutzerAntwort::from(&benutzer))))
}

/// GET /api/session – prueft das Session-Cookie
pub async fn session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Json<BenutzerAntwort>> {
    let token = session_token(&jar).ok_or(ApiError::NichtAngemeldet)?;
    let benutzer = state.auth.session_validieren(token).await.map_err(|e| {
        if !e.ist_unangemeldet() {
            tracing::warn!(fehler = %e, "Session-Pruefung fehlgeschlagen");
        }
        ApiError::from(e)
    })?;
    Ok(Json(BenutzerAntwort::from(&benutzer)))
}

/// POST /api/logout – beendet die Session und loescht das Cookie
pub async fn abmelden(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = session_token(&jar) {
        state.auth.abmelden(token).await;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::NO_CONTENT, jar).into_response()
}

/// Wert des Session-Cookies; leere Werte zaehlen als fehlend
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|wert| !wert.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn jar(cookie: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn cookie_unter_mehreren() {
        let jar = jar("theme=dark; holler-session=abc123; lang=de");
        assert_eq!(session_token(&jar), Some("abc123"));
    }

    #[test]
    fn kein_oder_leeres_cookie() {
        assert_eq!(session_token(&CookieJar::new()), None);
        assert_eq!(session_token(&jar("holler-session=")), None);
        assert_eq!(session_token(&jar("holler-sessionx=abc")), None);
    }
}
