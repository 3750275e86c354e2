//! HTTP-Fehler fuer die REST-API
//!
//! Jeder Fehler wird als `{"error": {"code", "message"}}` ausgeliefert.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use holler_auth::AuthError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Nicht angemeldet")]
    NichtAngemeldet,

    #[error("Benutzername oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("Konflikt: {0}")]
    Konflikt(String),

    #[error("Interner Fehler")]
    Intern(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UngueltigeEingabe(_) => StatusCode::BAD_REQUEST,
            Self::NichtAngemeldet | Self::UngueltigeAnmeldedaten => StatusCode::UNAUTHORIZED,
            Self::Konflikt(_) => StatusCode::CONFLICT,
            Self::Intern(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UngueltigeEingabe(msg) => Self::UngueltigeEingabe(msg),
            AuthError::UngueltigeAnmeldedaten => Self::UngueltigeAnmeldedaten,
            AuthError::SessionUngueltig
            | AuthError::SessionAbgelaufen
            | AuthError::BenutzerNichtGefunden(_) => Self::NichtAngemeldet,
            AuthError::BenutzernameVergeben(name) => {
                Self::Konflikt(format!("Benutzername '{name}' ist bereits vergeben"))
            }
            AuthError::PasswortHashing(msg) => Self::Intern(msg),
            AuthError::Datenbank(e) => Self::Intern(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::UngueltigeEingabe(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Intern(ref detail) = self {
            // Details nur ins Log, nicht an den Client
            tracing::error!(fehler = %detail, "Interner Fehler in der REST-API");
        }
        (
            status,
            Json(json!({
                "error": {
                    "code": status.as_u16(),
                    "message": self.to_string(),
                }
            })),
        )
            .into_response()
    }
}
