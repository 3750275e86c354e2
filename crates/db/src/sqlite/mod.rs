//! SQLite-Backend fuer alle Repository-Traits
//!
//! UUIDs und Zeitstempel liegen als TEXT in der Datenbank (RFC 3339).

pub mod audio;
pub mod pool;
pub mod users;

pub use pool::SqliteDb;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::DbResult;

pub(crate) fn uuid_lesen(spalte: &str, wert: &str) -> DbResult<Uuid> {
    Uuid::parse_str(wert).map_err(|e| DbError::Dekodierung(format!("{spalte}='{wert}': {e}")))
}

pub(crate) fn zeit_lesen(spalte: &str, wert: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(wert)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DbError::Dekodierung(format!("{spalte}='{wert}': {e}")))
}
