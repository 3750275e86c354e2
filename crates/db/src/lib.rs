//! holler-db – Datenbank-Abstraktion
//!
//! Repository-Pattern ueber SQLite (sqlx). Zwei Tabellen:
//! - `users`: registrierte Benutzer mit Argon2-Hash
//! - `audio_messages`: jedes weitergeleitete Audio-Segment
//!
//! `SqliteDb` implementiert zusaetzlich den `AudioLog`-Trait aus `holler-core`
//! und kann so direkt als Senke an den Relay uebergeben werden.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{AudioRepository, DatabaseConfig, DbResult, UserRepository};
pub use sqlite::SqliteDb;
