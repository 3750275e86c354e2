//! Gemeinsame Test-Stubs fuer die Unit-Tests des Crates

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use holler_core::{AudioLog, AuthStore, HollerError, Identitaet, UserId};
use holler_protocol::Frame;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::handle::{ClientHandle, Sendung};

pub fn handle(name: &str) -> (Arc<ClientHandle>, mpsc::Receiver<Sendung>) {
    ClientHandle::neu(Identitaet::neu(UserId::new(), name), 16)
}

/// Alle bisher eingereihten Frames eines Handles
pub fn empfangen(rx: &mut mpsc::Receiver<Sendung>) -> Vec<Frame> {
    let mut frames = Vec::new();
    while let Ok(sendung) = rx.try_recv() {
        frames.extend(sendung);
    }
    frames
}

/// AuthStore mit fester Benutzerliste
#[derive(Default)]
pub struct FesteBenutzer {
    benutzer: HashMap<String, Identitaet>,
}

impl FesteBenutzer {
    pub fn mit(namen: &[&str]) -> Self {
        let benutzer = namen
            .iter()
            .map(|n| (n.to_string(), Identitaet::neu(UserId::new(), *n)))
            .collect();
        Self { benutzer }
    }
}

#[async_trait]
impl AuthStore for FesteBenutzer {
    async fn aufloesen(&self, token: &str) -> holler_core::Result<Option<Identitaet>> {
        Ok(self.benutzer.get(token).cloned())
    }
}

/// AudioLog das alle Segmente im Speicher sammelt
#[derive(Default)]
pub struct SpeicherLog {
    pub eintraege: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl AudioLog for SpeicherLog {
    async fn anhaengen(&self, identitaet: &Identitaet, payload: &[u8]) -> holler_core::Result<()> {
        self.eintraege
            .lock()
            .push((identitaet.username.clone(), payload.to_vec()));
        Ok(())
    }
}

/// AudioLog das immer fehlschlaegt
pub struct KaputtesLog;

#[async_trait]
impl AudioLog for KaputtesLog {
    async fn anhaengen(&self, _identitaet: &Identitaet, _payload: &[u8]) -> holler_core::Result<()> {
        Err(HollerError::persistenz("Platte voll"))
    }
}
