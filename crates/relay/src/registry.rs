//! ClientRegistry – Menge aller aktiven Verbindungen
//!
//! Schluessel ist die `ConnectionId` der Verbindung, nicht der Benutzername:
//! derselbe Benutzer kann sich mehrfach verbinden. Alle Operationen laufen
//! unter einem `RwLock`, dadurch sind `hinzufuegen`, `entfernen` und
//! `snapshot` linearisierbar. Der Lock wird nie ueber einen `await` gehalten.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use holler_core::ConnectionId;
use parking_lot::RwLock;

use crate::handle::ClientHandle;

/// Thread-safe Registry der verbundenen Clients
#[derive(Default)]
pub struct ClientRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// Beitritts-Sequenz der naechsten Registrierung
    naechste_sequenz: u64,
    /// Handles in Beitrittsreihenfolge
    handles: BTreeMap<u64, Arc<ClientHandle>>,
    /// ConnectionId -> Beitritts-Sequenz
    index: HashMap<ConnectionId, u64>,
}

impl RegistryInner {
    fn einfuegen(&mut self, handle: Arc<ClientHandle>) {
        let id = handle.verbindung_id();
        assert!(
            !self.index.contains_key(&id),
            "Verbindung {id} ist bereits registriert"
        );

        let sequenz = self.naechste_sequenz;
        self.naechste_sequenz += 1;
        self.index.insert(id, sequenz);
        self.handles.insert(sequenz, handle);
    }
}

impl ClientRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert ein Handle
    ///
    /// # Panics
    /// Wenn dieselbe Verbindung bereits registriert ist (Aufruferfehler).
    pub fn hinzufuegen(&self, handle: Arc<ClientHandle>) {
        let id = handle.verbindung_id();
        self.inner.write().einfuegen(handle);
        tracing::debug!(verbindung = %id, "Client in Registry aufgenommen");
    }

    /// Registriert ein Handle, sofern weniger als `limit` Clients aktiv sind
    ///
    /// Pruefung und Einfuegen passieren unter demselben Lock.
    pub fn hinzufuegen_begrenzt(&self, handle: Arc<ClientHandle>, limit: usize) -> bool {
        let mut inner = self.inner.write();
        if inner.handles.len() >= limit {
            return false;
        }
        inner.einfuegen(handle);
        true
    }

    /// Entfernt ein Handle; fehlt es, passiert nichts
    ///
    /// Gibt zurueck, ob tatsaechlich etwas entfernt wurde.
    pub fn entfernen(&self, handle: &ClientHandle) -> bool {
        let mut inner = self.inner.write();
        match inner.index.remove(&handle.verbindung_id()) {
            Some(sequenz) => {
                inner.handles.remove(&sequenz);
                true
            }
            None => false,
        }
    }

    /// Kopie aller aktuellen Handles in Beitrittsreihenfolge
    pub fn snapshot(&self) -> Vec<Arc<ClientHandle>> {
        self.inner.read().handles.values().cloned().collect()
    }

    pub fn anzahl(&self) -> usize {
        self.inner.read().handles.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.anzahl() == 0
    }

    pub fn enthaelt(&self, id: &ConnectionId) -> bool {
        self.inner.read().index.contains_key(id)
    }
}
