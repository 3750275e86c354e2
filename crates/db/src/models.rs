//! Datenbankmodelle fuer Holler
//!
//! Reine Datenuebertragungsobjekte, getrennt von den Domain-Typen in `holler-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl BenutzerRecord {
    /// Wandelt den Datensatz in die Relay-Identitaet um
    pub fn identitaet(&self) -> holler_core::Identitaet {
        holler_core::Identitaet::neu(holler_core::UserId(self.id), self.username.clone())
    }
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Audio-Log
// ---------------------------------------------------------------------------

/// Ein gespeichertes Audio-Segment
#[derive(Debug, Clone)]
pub struct AudioNachrichtRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub audio_data: Vec<u8>,
}
