//! Fehlertypen fuer Holler
//!
//! Zentraler Fehler-Enum fuer crate-uebergreifende Fehler. Untermodule
//! definieren eigene Fehler und konvertieren via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer Holler
pub type Result<T> = std::result::Result<T, HollerError>;

/// Fehler die an den Collaborator-Grenzen (AuthStore, AudioLog) auftreten
#[derive(Debug, Error)]
pub enum HollerError {
    // --- Authentifizierung ---
    #[error("Authentifizierung fehlgeschlagen: {0}")]
    Authentifizierung(String),

    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    // --- Persistenz ---
    #[error("Persistenzfehler: {0}")]
    Persistenz(String),

    // --- Verbindung ---
    #[error("Verbindung getrennt: {0}")]
    Getrennt(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl HollerError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Erstellt einen Persistenzfehler
    pub fn persistenz(msg: impl Into<String>) -> Self {
        Self::Persistenz(msg.into())
    }
}
