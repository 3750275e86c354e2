//! Verbindungspool und Migrationen

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::repository::{DatabaseConfig, DbResult};

/// Wie lange SQLite bei gesperrter Datei wartet, bevor `SQLITE_BUSY` kommt
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-Datenbank; Clone teilt den Pool
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
}

impl SqliteDb {
    /// Oeffnet (oder erstellt) die Datenbankdatei und migriert sie
    pub async fn oeffnen(config: &DatabaseConfig) -> DbResult<Self> {
        let journal = if config.sqlite_wal {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };
        let optionen = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(journal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_verbindungen.max(1))
            .connect_with(optionen)
            .await?;
        tracing::info!(url = %config.url, wal = config.sqlite_wal, "SQLite geoeffnet");

        Self::migriert(pool).await
    }

    /// Private In-Memory-Datenbank (Tests)
    ///
    /// Genau eine Verbindung, die nie geschlossen wird: jede weitere
    /// Verbindung saehe eine eigene, leere Datenbank.
    pub async fn in_memory() -> DbResult<Self> {
        let optionen = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(optionen)
            .await?;

        Self::migriert(pool).await
    }

    async fn migriert(pool: SqlitePool) -> DbResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Migrationen angewendet");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Schliesst den Pool; laufende Abfragen werden noch beendet
    pub async fn schliessen(&self) {
        self.pool.close().await;
    }
}
