//! SQLite-Implementierung des Audio-Logs
//!
//! Jedes weitergeleitete Segment landet als BLOB in `audio_messages`.
//! `SqliteDb` implementiert ausserdem `holler_core::AudioLog`, damit der
//! Relay die Datenbank direkt als Senke verwenden kann.

use async_trait::async_trait;
use chrono::Utc;
use holler_core::{AudioLog, HollerError, Identitaet};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::AudioNachrichtRecord;
use crate::repository::{AudioRepository, DbResult};
use crate::sqlite::{pool::SqliteDb, uuid_lesen, zeit_lesen};

impl AudioRepository for SqliteDb {
    async fn audio_anhaengen(&self, user_id: Uuid, audio_data: &[u8]) -> DbResult<i64> {
        let id = sqlx::query(
            "INSERT INTO audio_messages (user_id, timestamp, audio_data) VALUES (?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(audio_data)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::trace!(user_id = %user_id, bytes = audio_data.len(), id, "Audio-Segment gespeichert");
        Ok(id)
    }

    async fn audio_fuer_benutzer(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<AudioNachrichtRecord>> {
        sqlx::query_as::<_, AudioZeile>(
            "SELECT id, user_id, timestamp, audio_data FROM audio_messages
             WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(AudioNachrichtRecord::try_from)
        .collect()
    }

    async fn audio_anzahl(&self) -> DbResult<i64> {
        let anzahl = sqlx::query_scalar("SELECT COUNT(*) FROM audio_messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(anzahl)
    }
}

#[async_trait]
impl AudioLog for SqliteDb {
    async fn anhaengen(&self, identitaet: &Identitaet, payload: &[u8]) -> holler_core::Result<()> {
        self.audio_anhaengen(identitaet.id.inner(), payload)
            .await
            .map(|_| ())
            .map_err(|e| HollerError::persistenz(e.to_string()))
    }
}

#[derive(sqlx::FromRow)]
struct AudioZeile {
    id: i64,
    user_id: String,
    timestamp: String,
    audio_data: Vec<u8>,
}

impl TryFrom<AudioZeile> for AudioNachrichtRecord {
    type Error = DbError;

    fn try_from(z: AudioZeile) -> DbResult<Self> {
        Ok(Self {
            id: z.id,
            user_id: uuid_lesen("audio_messages.user_id", &z.user_id)?,
            timestamp: zeit_lesen("audio_messages.timestamp", &z.timestamp)?,
            audio_data: z.audio_data,
        })
    }
}
