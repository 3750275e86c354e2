//! Fehler der Persistenzschicht

use thiserror::Error;

/// Fehler beim Zugriff auf SQLite
#[derive(Debug, Error)]
pub enum DbError {
    /// Datensatz existiert nicht (z.B. beim Update)
    #[error("{0} existiert nicht")]
    NichtGefunden(String),

    /// UNIQUE-Constraint verletzt
    #[error("Wert bereits vorhanden: {0}")]
    Eindeutigkeit(String),

    /// Gespeicherter Wert laesst sich nicht zurueckwandeln
    #[error("Spalte {0} unlesbar")]
    Dekodierung(String),

    #[error("Migration fehlgeschlagen: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("SQLite-Fehler: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Eindeutigkeit(db.message().to_string())
            }
            andere => Self::Sqlx(andere),
        }
    }
}

impl DbError {
    pub fn ist_eindeutigkeit(&self) -> bool {
        matches!(self, Self::Eindeutigkeit(_))
    }
}
