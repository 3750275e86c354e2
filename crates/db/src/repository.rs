//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Die Futures sind `Send`, damit Services die
//! Repositories aus tokio-Tasks heraus benutzen koennen.

use std::future::Future;

use uuid::Uuid;

use crate::error::DbError;
use crate::models::{AudioNachrichtRecord, BenutzerRecord, NeuerBenutzer};

/// Result-Alias fuer Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://holler.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://holler.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Benutzer-Datenzugriffe
pub trait UserRepository: Send + Sync {
    /// Legt einen Benutzer an; doppelter Name ergibt `DbError::Eindeutigkeit`
    fn create(
        &self,
        data: NeuerBenutzer<'_>,
    ) -> impl Future<Output = DbResult<BenutzerRecord>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DbResult<Option<BenutzerRecord>>> + Send;

    fn get_by_name(
        &self,
        username: &str,
    ) -> impl Future<Output = DbResult<Option<BenutzerRecord>>> + Send;

    fn update_last_login(&self, id: Uuid) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository fuer das Audio-Log
pub trait AudioRepository: Send + Sync {
    /// Haengt ein Segment an und gibt die neue Zeilen-ID zurueck
    fn audio_anhaengen(
        &self,
        user_id: Uuid,
        audio_data: &[u8],
    ) -> impl Future<Output = DbResult<i64>> + Send;

    /// Die juengsten Segmente eines Benutzers, neueste zuerst
    fn audio_fuer_benutzer(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> impl Future<Output = DbResult<Vec<AudioNachrichtRecord>>> + Send;

    fn audio_anzahl(&self) -> impl Future<Output = DbResult<i64>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_config_standard() {
        let cfg = DatabaseConfig::default();
        assert_eq!(cfg.url, "sqlite://holler.db");
        assert!(cfg.sqlite_wal);
        assert_eq!(cfg.max_verbindungen, 5);
    }
}
