//! Collaborator-Traits des Relay-Kerns
//!
//! Der Relay kennt weder Passwoerter noch das Speicherformat des Audio-Logs.
//! Beide Faehigkeiten werden ueber diese Traits von aussen hereingereicht.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Identitaet;

/// Loest einen vom Aufrufer gelieferten Identitaets-Token (z.B. Benutzername)
/// in eine stabile Identitaet auf.
///
/// `Ok(None)` bedeutet "unbekannt". Der Relay behandelt `Ok(None)` und `Err(_)`
/// gleichermassen als Authentifizierungsfehler.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn aufloesen(&self, token: &str) -> Result<Option<Identitaet>>;
}

/// Dauerhafte Ablage eines Audio-Segments
///
/// Ein Fehler hier ist fuer den Live-Relay nicht fatal.
#[async_trait]
pub trait AudioLog: Send + Sync {
    async fn anhaengen(&self, identitaet: &Identitaet, payload: &[u8]) -> Result<()>;
}
