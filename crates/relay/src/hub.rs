//! Gemeinsamer Hub-Zustand
//!
//! Der `HubKontext` wird beim Start einmal erstellt und an jede Session
//! weitergereicht. Er haelt die Registry, die Collaborators und die daraus
//! abgeleiteten Engine- und Notifier-Instanzen.

use std::sync::Arc;
use std::time::Duration;

use holler_core::{AudioLog, AuthStore};
use serde::{Deserialize, Serialize};

use crate::broadcast::BroadcastEngine;
use crate::membership::MembershipNotifier;
use crate::registry::ClientRegistry;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration des Relay-Kerns (`[relay]` in der Server-Konfiguration)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayKonfig {
    /// Groesse der Send-Queue pro Client (in Sendungen)
    pub sende_queue_groesse: usize,
    /// Wie lange auf Platz in einer vollen Queue gewartet wird
    pub schreib_timeout_ms: u64,
    /// Groessere Binaer-Frames werden verworfen
    pub max_payload_bytes: usize,
    /// Maximale Anzahl gleichzeitig registrierter Clients
    pub max_clients: usize,
}

impl Default for RelayKonfig {
    fn default() -> Self {
        Self {
            sende_queue_groesse: 64,
            schreib_timeout_ms: 250,
            max_payload_bytes: 1024 * 1024,
            max_clients: 512,
        }
    }
}

impl RelayKonfig {
    pub fn schreib_timeout(&self) -> Duration {
        Duration::from_millis(self.schreib_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// HubKontext
// ---------------------------------------------------------------------------

/// Gemeinsamer Zustand aller Verbindungen (Arc-geteilt)
pub struct HubKontext {
    pub konfig: RelayKonfig,
    pub registry: Arc<ClientRegistry>,
    pub auth_store: Arc<dyn AuthStore>,
    pub audio_log: Arc<dyn AudioLog>,
    pub engine: BroadcastEngine,
    pub notifier: MembershipNotifier,
}

impl HubKontext {
    pub fn neu(
        konfig: RelayKonfig,
        auth_store: Arc<dyn AuthStore>,
        audio_log: Arc<dyn AudioLog>,
    ) -> Arc<Self> {
        let registry = Arc::new(ClientRegistry::neu());
        let engine = BroadcastEngine::neu(Arc::clone(&registry), Arc::clone(&audio_log), &konfig);
        let notifier = MembershipNotifier::neu(Arc::clone(&registry), konfig.schreib_timeout());

        Arc::new(Self {
            konfig,
            registry,
            auth_store,
            audio_log,
            engine,
            notifier,
        })
    }

    pub fn online_anzahl(&self) -> usize {
        self.registry.anzahl()
    }

    /// Schliesst alle aktiven Verbindungen (Shutdown)
    ///
    /// Jede Session meldet sich danach selbst ab und kuendigt den Roster an.
    pub fn alle_trennen(&self) -> usize {
        let handles = self.registry.snapshot();
        for handle in &handles {
            handle.schliessen();
        }
        if !handles.is_empty() {
            tracing::info!(anzahl = handles.len(), "Alle Verbindungen werden getrennt");
        }
        handles.len()
    }
}
