//! Benutzer-Tabelle

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{BenutzerRecord, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::{pool::SqliteDb, uuid_lesen, zeit_lesen};

const SPALTEN: &str = "id, username, password_hash, created_at, last_login";

/// Rohe Zeile wie SQLite sie liefert
#[derive(sqlx::FromRow)]
struct BenutzerZeile {
    id: String,
    username: String,
    password_hash: String,
    created_at: String,
    last_login: Option<String>,
}

impl TryFrom<BenutzerZeile> for BenutzerRecord {
    type Error = DbError;

    fn try_from(z: BenutzerZeile) -> DbResult<Self> {
        Ok(Self {
            id: uuid_lesen("users.id", &z.id)?,
            created_at: zeit_lesen("users.created_at", &z.created_at)?,
            last_login: z
                .last_login
                .as_deref()
                .map(|t| zeit_lesen("users.last_login", t))
                .transpose()?,
            username: z.username,
            password_hash: z.password_hash,
        })
    }
}

impl SqliteDb {
    async fn benutzer_wo(&self, spalte: &str, wert: &str) -> DbResult<Option<BenutzerRecord>> {
        let sql = format!("SELECT {SPALTEN} FROM users WHERE {spalte} = ?");
        sqlx::query_as::<_, BenutzerZeile>(&sql)
            .bind(wert)
            .fetch_optional(&self.pool)
            .await?
            .map(BenutzerRecord::try_from)
            .transpose()
    }
}

impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let sql = format!(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING {SPALTEN}"
        );
        let zeile = sqlx::query_as::<_, BenutzerZeile>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(data.username)
            .bind(data.password_hash)
            .bind(Utc::now().to_rfc3339())
            .fetch_one(&self.pool)
            .await?;

        BenutzerRecord::try_from(zeile)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<BenutzerRecord>> {
        self.benutzer_wo("id", &id.to_string()).await
    }

    async fn get_by_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>> {
        self.benutzer_wo("username", username).await
    }

    async fn update_last_login(&self, id: Uuid) -> DbResult<()> {
        let ergebnis = sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        match ergebnis.rows_affected() {
            0 => Err(DbError::NichtGefunden(format!("Benutzer {id}"))),
            _ => Ok(()),
        }
    }
}
