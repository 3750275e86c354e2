//! holler-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod error;
pub mod http;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::ServerConfig;
use holler_auth::{session::STANDARD_TTL, AuthService, PasswortHasher, SessionStore};
use holler_core::{AudioLog, AuthStore};
use holler_db::{DatabaseConfig, SqliteDb};
use holler_relay::{HubKontext, TcpRelayServer};
use tokio::sync::watch;

use crate::http::AppState;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren
    /// 2. Auth-Service und Hub-Kontext aufbauen
    /// 3. Optional den TCP-Relay starten
    /// 4. HTTP-Server (API, WebSocket, statische Dateien) starten
    /// 5. Auf Ctrl-C warten, dann alle Verbindungen trennen
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            http = %self.config.http_bind_adresse(),
            tcp = ?self.config.tcp_bind_adresse(),
            "Server startet"
        );

        let db = SqliteDb::oeffnen(&DatabaseConfig::from(&self.config.datenbank))
            .await
            .with_context(|| format!("Datenbank '{}' nicht verfuegbar", self.config.datenbank.url))?;
        let db = Arc::new(db);

        let (state, _cleanup) = zustand_aufbauen(Arc::clone(&db), &self.config);
        let hub = Arc::clone(&state.hub);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tcp_task = match self.config.tcp_bind_adresse() {
            Some(adresse) => {
                let tcp = TcpRelayServer::binden(Arc::clone(&hub), adresse.as_str())
                    .await
                    .with_context(|| format!("TCP-Relay kann '{adresse}' nicht binden"))?;
                Some(tokio::spawn(tcp.starten(shutdown_rx.clone())))
            }
            None => None,
        };

        let app = http::router(state, &self.config.server.static_verzeichnis);
        let listener = tokio::net::TcpListener::bind(self.config.http_bind_adresse())
            .await
            .with_context(|| format!("HTTP kann '{}' nicht binden", self.config.http_bind_adresse()))?;
        tracing::info!(adresse = %listener.local_addr()?, "HTTP-Server gestartet");

        let mut http_shutdown = shutdown_rx.clone();
        let http_task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = http_shutdown.wait_for(|stop| *stop).await;
                })
                .await
        });

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        let _ = shutdown_tx.send(true);
        hub.alle_trennen();

        if let Some(tcp_task) = tcp_task {
            tcp_task.await??;
        }
        http_task.await??;
        db.schliessen().await;

        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Baut Auth-Service und Hub-Kontext ueber einer geoeffneten Datenbank auf
///
/// Gibt zusaetzlich den Handle des Session-Cleanup-Tasks zurueck.
pub fn zustand_aufbauen(
    db: Arc<SqliteDb>,
    config: &ServerConfig,
) -> (AppState, tokio::task::JoinHandle<()>) {
    zustand_mit_hasher(db, config, PasswortHasher::standard())
}

/// Wie `zustand_aufbauen`, aber mit frei waehlbaren Argon2-Parametern
pub fn zustand_mit_hasher(
    db: Arc<SqliteDb>,
    config: &ServerConfig,
    hasher: PasswortHasher,
) -> (AppState, tokio::task::JoinHandle<()>) {
    let sessions = SessionStore::neu(STANDARD_TTL);
    let cleanup = sessions.cleanup_starten();
    let auth = Arc::new(AuthService::neu(Arc::clone(&db), sessions, hasher));

    let auth_store: Arc<dyn AuthStore> = auth.clone();
    let audio_log: Arc<dyn AudioLog> = db;
    let hub = HubKontext::neu(config.relay.clone(), auth_store, audio_log);

    (AppState { auth, hub }, cleanup)
}
