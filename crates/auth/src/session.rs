//! Session-Management fuer eingeloggte Benutzer
//!
//! Sessions leben nur im Speicher. Der Token landet beim Login als Cookie
//! im Browser und wird bei `/api/session` wieder vorgelegt. Ein optionaler
//! Hintergrund-Task raeumt abgelaufene Eintraege auf.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use rand::RngCore;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Standard-Session-Lebensdauer: 7 Tage
pub const STANDARD_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Intervall fuer den Cleanup-Task
const CLEANUP_INTERVALL: Duration = Duration::from_secs(15 * 60);

/// Ein aktives Session-Token
#[derive(Debug, Clone)]
pub struct Session {
    /// URL-sicheres Base64, 32 Zufallsbytes
    pub token: String,
    pub user_id: Uuid,
    pub erstellt_am: DateTime<Utc>,
    pub laeuft_ab_am: DateTime<Utc>,
}

impl Session {
    pub fn ist_gueltig(&self) -> bool {
        Utc::now() < self.laeuft_ab_am
    }
}

/// In-Memory Session-Store mit fester TTL
#[derive(Debug)]
pub struct SessionStore {
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn neu(ttl: Duration) -> Arc<Self> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(7));
        Arc::new(Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Startet den periodischen Cleanup; der Task endet mit dem Runtime-Shutdown
    pub fn cleanup_starten(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut intervall = tokio::time::interval(CLEANUP_INTERVALL);
            intervall.tick().await;
            loop {
                intervall.tick().await;
                let entfernt = store.abgelaufene_bereinigen().await;
                if entfernt > 0 {
                    tracing::debug!(anzahl = entfernt, "Abgelaufene Sessions bereinigt");
                }
            }
        })
    }

    pub async fn erstellen(&self, user_id: Uuid) -> Session {
        let jetzt = Utc::now();
        let session = Session {
            token: token_generieren(),
            user_id,
            erstellt_am: jetzt,
            laeuft_ab_am: jetzt + self.ttl,
        };

        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        tracing::debug!(user_id = %user_id, "Neue Session erstellt");
        session
    }

    /// Abgelaufene Sessions werden beim Pruefen gleich entfernt
    pub async fn validieren(&self, token: &str) -> AuthResult<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return Err(AuthError::SessionUngueltig),
                Some(s) if s.ist_gueltig() => return Ok(s.clone()),
                Some(_) => {}
            }
        }
        self.sessions.write().await.remove(token);
        Err(AuthError::SessionAbgelaufen)
    }

    /// Gibt `true` zurueck wenn der Token existierte
    pub async fn invalidieren(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn abgelaufene_bereinigen(&self) -> usize {
        let jetzt = Utc::now();
        let mut sessions = self.sessions.write().await;
        let vorher = sessions.len();
        sessions.retain(|_, s| s.laeuft_ab_am > jetzt);
        vorher - sessions.len()
    }

    pub async fn anzahl(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn token_generieren() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_erstellen_und_validieren() {
        let store = SessionStore::neu(STANDARD_TTL);
        let user_id = Uuid::new_v4();

        let session = store.erstellen(user_id).await;
        assert!(session.ist_gueltig());
        assert_eq!(session.token.len(), 43, "32 Bytes Base64 ohne Padding");

        let validiert = store.validieren(&session.token).await.unwrap();
        assert_eq!(validiert.user_id, user_id);
    }

    #[tokio::test]
    async fn unbekannter_token() {
        let store = SessionStore::neu(STANDARD_TTL);
        let ergebnis = store.validieren("gibt_es_nicht").await;
        assert!(matches!(ergebnis, Err(AuthError::SessionUngueltig)));
    }

    #[tokio::test]
    async fn abgelaufene_session_wird_entfernt() {
        let store = SessionStore::neu(Duration::ZERO);
        let session = store.erstellen(Uuid::new_v4()).await;

        let ergebnis = store.validieren(&session.token).await;
        assert!(matches!(ergebnis, Err(AuthError::SessionAbgelaufen)));
        assert_eq!(store.anzahl().await, 0);
    }

    #[tokio::test]
    async fn invalidieren_ist_idempotent() {
        let store = SessionStore::neu(STANDARD_TTL);
        let session = store.erstellen(Uuid::new_v4()).await;

        assert!(store.invalidieren(&session.token).await);
        assert!(!store.invalidieren(&session.token).await);
        assert!(matches!(
            store.validieren(&session.token).await,
            Err(AuthError::SessionUngueltig)
        ));
    }

    #[tokio::test]
    async fn bereinigen_zaehlt_entfernte() {
        let kurz = SessionStore::neu(Duration::ZERO);
        kurz.erstellen(Uuid::new_v4()).await;
        kurz.erstellen(Uuid::new_v4()).await;
        assert_eq!(kurz.abgelaufene_bereinigen().await, 2);

        let lang = SessionStore::neu(STANDARD_TTL);
        lang.erstellen(Uuid::new_v4()).await;
        assert_eq!(lang.abgelaufene_bereinigen().await, 0);
    }

    #[tokio::test]
    async fn tokens_sind_eindeutig() {
        let store = SessionStore::neu(STANDARD_TTL);
        let user_id = Uuid::new_v4();
        let a = store.erstellen(user_id).await;
        let b = store.erstellen(user_id).await;
        assert_ne!(a.token, b.token);
    }
}
