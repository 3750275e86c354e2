//! Auth-Service fuer Holler
//!
//! Zentraler Service fuer Registrierung, Login, Logout und Session-Pruefung.
//! Implementiert ausserdem `AuthStore`: der Relay vertraut einer bereits
//! authentifizierten Identitaet und loest nur den Benutzernamen auf, ohne
//! das Passwort erneut zu pruefen.

use std::sync::Arc;

use async_trait::async_trait;
use holler_core::{AuthStore, HollerError, Identitaet};
use holler_db::{
    models::{BenutzerRecord, NeuerBenutzer},
    UserRepository,
};

use crate::{
    error::{AuthError, AuthResult},
    password::PasswortHasher,
    session::{Session, SessionStore},
};

/// Maximale Laenge eines Benutzernamens in Zeichen
pub const MAX_USERNAME_LAENGE: usize = 32;

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<U: UserRepository> {
    user_repo: Arc<U>,
    sessions: Arc<SessionStore>,
    hasher: PasswortHasher,
}

impl<U: UserRepository> AuthService<U> {
    pub fn neu(user_repo: Arc<U>, sessions: Arc<SessionStore>, hasher: PasswortHasher) -> Self {
        Self {
            user_repo,
            sessions,
            hasher,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Registriert einen neuen Benutzer
    pub async fn registrieren(&self, username: &str, passwort: &str) -> AuthResult<BenutzerRecord> {
        username_pruefen(username)?;
        if passwort.is_empty() {
            return Err(AuthError::ungueltige_eingabe("Passwort darf nicht leer sein"));
        }

        let passwort_hash = self.hasher.hashen(passwort)?;

        // Eindeutigkeit erzwingt die Datenbank, nicht ein vorheriges SELECT
        let benutzer = self
            .user_repo
            .create(NeuerBenutzer {
                username,
                password_hash: &passwort_hash,
            })
            .await
            .map_err(|e| {
                if e.ist_eindeutigkeit() {
                    AuthError::BenutzernameVergeben(username.to_string())
                } else {
                    AuthError::Datenbank(e)
                }
            })?;

        tracing::info!(
            user_id = %benutzer.id,
            username = %benutzer.username,
            "Neuer Benutzer registriert"
        );

        Ok(benutzer)
    }

    /// Prueft die Anmeldedaten und erstellt eine neue Session
    pub async fn anmelden(
        &self,
        username: &str,
        passwort: &str,
    ) -> AuthResult<(BenutzerRecord, Session)> {
        let benutzer = self
            .user_repo
            .get_by_name(username)
            .await?
            .ok_or(AuthError::UngueltigeAnmeldedaten)?;

        if !self.hasher.verifizieren(passwort, &benutzer.password_hash)? {
            tracing::warn!(username = %username, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        self.user_repo.update_last_login(benutzer.id).await?;
        let session = self.sessions.erstellen(benutzer.id).await;

        tracing::info!(
            user_id = %benutzer.id,
            username = %benutzer.username,
            "Benutzer angemeldet"
        );

        Ok((benutzer, session))
    }

    pub async fn abmelden(&self, session_token: &str) -> bool {
        self.sessions.invalidieren(session_token).await
    }

    /// Validiert einen Session-Token und gibt den zugehoerigen Benutzer zurueck
    pub async fn session_validieren(&self, token: &str) -> AuthResult<BenutzerRecord> {
        let session = self.sessions.validieren(token).await?;

        let benutzer = self
            .user_repo
            .get_by_id(session.user_id)
            .await?
            .ok_or_else(|| AuthError::BenutzerNichtGefunden(session.user_id.to_string()))?;

        Ok(benutzer)
    }
}

#[async_trait]
impl<U: UserRepository + 'static> AuthStore for AuthService<U> {
    async fn aufloesen(&self, token: &str) -> holler_core::Result<Option<Identitaet>> {
        let benutzer = self
            .user_repo
            .get_by_name(token)
            .await
            .map_err(|e| HollerError::Authentifizierung(e.to_string()))?;

        Ok(benutzer.map(|b| b.identitaet()))
    }
}

fn username_pruefen(username: &str) -> AuthResult<()> {
    let laenge = username.chars().count();
    if laenge == 0 {
        return Err(AuthError::ungueltige_eingabe("Benutzername darf nicht leer sein"));
    }
    if laenge > MAX_USERNAME_LAENGE {
        return Err(AuthError::ungueltige_eingabe(format!(
            "Benutzername laenger als {MAX_USERNAME_LAENGE} Zeichen"
        )));
    }
    if username.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(AuthError::ungueltige_eingabe(
            "Benutzername enthaelt Leer- oder Steuerzeichen",
        ));
    }
    Ok(())
}
