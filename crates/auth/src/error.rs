//! Fehler von Registrierung, Login und Session-Pruefung

use holler_db::DbError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Benutzername oder Passwort verletzen die Formatregeln
    #[error("ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Benutzername '{0}' ist vergeben")]
    BenutzernameVergeben(String),

    /// Absichtlich ohne Hinweis ob Name oder Passwort falsch war
    #[error("Anmeldung fehlgeschlagen")]
    UngueltigeAnmeldedaten,

    /// Session verweist auf einen inzwischen geloeschten Benutzer
    #[error("kein Benutzer mit ID {0}")]
    BenutzerNichtGefunden(String),

    #[error("unbekannter Session-Token")]
    SessionUngueltig,

    #[error("Session-Token abgelaufen")]
    SessionAbgelaufen,

    #[error("argon2: {0}")]
    PasswortHashing(String),

    #[error(transparent)]
    Datenbank(#[from] DbError),
}

impl AuthError {
    pub fn ungueltige_eingabe(msg: impl Into<String>) -> Self {
        Self::UngueltigeEingabe(msg.into())
    }

    /// Fehler, bei denen der Aufrufer schlicht nicht angemeldet ist
    pub fn ist_unangemeldet(&self) -> bool {
        matches!(
            self,
            Self::SessionUngueltig | Self::SessionAbgelaufen | Self::BenutzerNichtGefunden(_)
        )
    }
}
