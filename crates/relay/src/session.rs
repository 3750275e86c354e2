//! Connection-Session – Lebenszyklus einer einzelnen Verbindung
//!
//! Jede Verbindung bekommt eine `ConnectionSession` in einem eigenen
//! tokio-Task. Die Session loest die Identitaet auf, registriert den Client,
//! liest Frames bis zum Verbindungsende und meldet den Client wieder ab.
//!
//! ## State Machine
//! ```text
//! Verbindend -> Authentifizierend -> Registriert -> Ablaufend -> Geschlossen
//!                      |                                            ^
//!                      +------------- abgelehnt --------------------+
//! ```
//!
//! Abgelehnte Verbindungen werden nie registriert und loesen keine
//! Roster-Ankuendigung aus. Registrierte Verbindungen werden auf jedem
//! Ausstiegspfad genau einmal abgemeldet und angekuendigt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use holler_core::{ConnectionId, Identitaet};
use holler_protocol::Frame;
use tokio::sync::mpsc;

use crate::handle::{ClientHandle, Sendung};
use crate::hub::HubKontext;
use crate::transport::{FrameQuelle, FrameSenke};

/// Wie lange nach dem Schliessen auf den Writer-Task gewartet wird
const WRITER_NACHLAUF: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Zustaende und Ergebnisse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitzungsZustand {
    /// Transport steht, Identitaet noch unbekannt
    Verbindend,
    /// AuthStore wird befragt
    Authentifizierend,
    /// In der Registry, Leseschleife laeuft
    Registriert,
    /// Leseschleife beendet, Abmeldung laeuft
    Ablaufend,
    Geschlossen,
}

/// Warum eine Verbindung vor der Registrierung abgewiesen wurde
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AblehnungsGrund {
    /// AuthStore kennt den Token nicht
    UnbekannteIdentitaet,
    /// AuthStore meldete einen Fehler
    AuthFehler(String),
    /// `max_clients` erreicht
    ServerVoll,
}

/// Warum eine registrierte Verbindung beendet wurde
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrennungsGrund {
    /// Gegenstelle hat den Stream beendet
    StreamBeendet,
    /// Gegenstelle hat einen Close-Frame geschickt
    ClientGetrennt,
    Lesefehler(String),
    /// Handle wurde geschlossen (Shutdown, Schreibfehler, langsamer Empfaenger)
    Geschlossen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitzungsErgebnis {
    Abgelehnt(AblehnungsGrund),
    Beendet {
        verbindung: ConnectionId,
        identitaet: Identitaet,
        grund: TrennungsGrund,
    },
}

// ---------------------------------------------------------------------------
// ConnectionSession
// ---------------------------------------------------------------------------

pub struct ConnectionSession {
    kontext: Arc<HubKontext>,
    /// Bezeichnung der Gegenstelle fuer Logs (z.B. Socket-Adresse)
    peer: String,
    zustand: SitzungsZustand,
}

impl ConnectionSession {
    pub fn neu(kontext: Arc<HubKontext>, peer: impl Into<String>) -> Self {
        Self {
            kontext,
            peer: peer.into(),
            zustand: SitzungsZustand::Verbindend,
        }
    }

    pub fn zustand(&self) -> SitzungsZustand {
        self.zustand
    }

    fn uebergang(&mut self, nach: SitzungsZustand) {
        tracing::trace!(peer = %self.peer, von = ?self.zustand, nach = ?nach, "Zustandswechsel");
        self.zustand = nach;
    }

    /// Fuehrt die Session bis zum Verbindungsende aus
    ///
    /// `token` wird dem AuthStore zur Aufloesung uebergeben. Die Senke geht
    /// an einen eigenen Writer-Task, der die Ausgangs-Queue des Handles leert.
    pub async fn ausfuehren<Q, S>(mut self, token: &str, mut quelle: Q, senke: S) -> SitzungsErgebnis
    where
        Q: FrameQuelle,
        S: FrameSenke + 'static,
    {
        self.uebergang(SitzungsZustand::Authentifizierend);

        let identitaet = match self.kontext.auth_store.aufloesen(token).await {
            Ok(Some(identitaet)) => identitaet,
            Ok(None) => {
                tracing::info!(peer = %self.peer, token = %token, "Unbekannte Identitaet – Verbindung abgelehnt");
                return self.ablehnen(senke, AblehnungsGrund::UnbekannteIdentitaet).await;
            }
            Err(e) => {
                tracing::warn!(peer = %self.peer, fehler = %e, "AuthStore-Fehler – Verbindung abgelehnt");
                return self.ablehnen(senke, AblehnungsGrund::AuthFehler(e.to_string())).await;
            }
        };

        let (handle, ausgang) =
            ClientHandle::neu(identitaet.clone(), self.kontext.konfig.sende_queue_groesse);

        if !self
            .kontext
            .registry
            .hinzufuegen_begrenzt(Arc::clone(&handle), self.kontext.konfig.max_clients)
        {
            tracing::warn!(
                peer = %self.peer,
                max = self.kontext.konfig.max_clients,
                "Server voll – Verbindung abgelehnt"
            );
            return self.ablehnen(senke, AblehnungsGrund::ServerVoll).await;
        }

        // Ab hier ist der Client registriert; die Abmeldung laeuft auch dann,
        // wenn dieser Future abgebrochen wird
        let abmeldung = Abmeldung::neu(Arc::clone(&self.kontext), Arc::clone(&handle));
        let mut writer = tokio::spawn(schreiber(Arc::clone(&handle), ausgang, senke));

        self.uebergang(SitzungsZustand::Registriert);
        tracing::info!(
            peer = %self.peer,
            verbindung = %handle.verbindung_id(),
            username = %handle.username(),
            "Client verbunden"
        );
        self.kontext.notifier.ankuendigen().await;

        let grund = loop {
            let gelesen = tokio::select! {
                biased;
                _ = handle.geschlossen() => break TrennungsGrund::Geschlossen,
                gelesen = quelle.frame_lesen() => gelesen,
            };

            match gelesen {
                Ok(Some(Frame::Binaer(payload))) => {
                    self.kontext.engine.frame_verarbeiten(&handle, payload).await;
                }
                Ok(Some(Frame::Schliessen)) => break TrennungsGrund::ClientGetrennt,
                Ok(Some(anderer)) => {
                    tracing::trace!(peer = %self.peer, frame = ?anderer, "Nicht-Audio-Frame ignoriert");
                }
                Ok(None) => break TrennungsGrund::StreamBeendet,
                Err(e) => break TrennungsGrund::Lesefehler(e.to_string()),
            }
        };

        self.uebergang(SitzungsZustand::Ablaufend);
        abmeldung.ausfuehren().await;
        handle.schliessen();

        if tokio::time::timeout(WRITER_NACHLAUF, &mut writer).await.is_err() {
            tracing::debug!(peer = %self.peer, "Writer-Task haengt – wird abgebrochen");
            writer.abort();
        }

        self.uebergang(SitzungsZustand::Geschlossen);
        tracing::info!(
            peer = %self.peer,
            verbindung = %handle.verbindung_id(),
            username = %handle.username(),
            grund = ?grund,
            "Client getrennt"
        );

        SitzungsErgebnis::Beendet {
            verbindung: handle.verbindung_id(),
            identitaet,
            grund,
        }
    }

    async fn ablehnen<S: FrameSenke>(mut self, mut senke: S, grund: AblehnungsGrund) -> SitzungsErgebnis {
        if let Err(e) = senke.schliessen().await {
            tracing::debug!(peer = %self.peer, fehler = %e, "Schliessen nach Ablehnung fehlgeschlagen");
        }
        self.uebergang(SitzungsZustand::Geschlossen);
        SitzungsErgebnis::Abgelehnt(grund)
    }
}

// ---------------------------------------------------------------------------
// Writer-Task
// ---------------------------------------------------------------------------

/// Leert die Ausgangs-Queue in die Senke, bis das Handle geschlossen wird
async fn schreiber<S: FrameSenke>(
    handle: Arc<ClientHandle>,
    mut ausgang: mpsc::Receiver<Sendung>,
    mut senke: S,
) {
    'queue: loop {
        let sendung = tokio::select! {
            biased;
            _ = handle.geschlossen() => break,
            sendung = ausgang.recv() => match sendung {
                Some(sendung) => sendung,
                None => break,
            },
        };

        for frame in sendung {
            if let Err(e) = senke.frame_schreiben(frame).await {
                tracing::debug!(
                    verbindung = %handle.verbindung_id(),
                    fehler = %e,
                    "Schreiben fehlgeschlagen – Verbindung wird geschlossen"
                );
                handle.schliessen();
                break 'queue;
            }
        }
    }

    if let Err(e) = senke.schliessen().await {
        tracing::trace!(verbindung = %handle.verbindung_id(), fehler = %e, "Senke bereits geschlossen");
    }
}

// ---------------------------------------------------------------------------
// Abmeldung
// ---------------------------------------------------------------------------

/// Entfernt den Client genau einmal aus der Registry und kuendigt den Roster an
///
/// Wird die Session abgebrochen bevor die Ankuendigung vollstaendig raus ist,
/// schliesst `Drop` das Handle, holt die Abmeldung nach und startet die
/// Ankuendigung als eigenen Task.
struct Abmeldung {
    kontext: Arc<HubKontext>,
    handle: Arc<ClientHandle>,
    entfernt: AtomicBool,
    angekuendigt: AtomicBool,
}

impl Abmeldung {
    fn neu(kontext: Arc<HubKontext>, handle: Arc<ClientHandle>) -> Self {
        Self {
            kontext,
            handle,
            entfernt: AtomicBool::new(false),
            angekuendigt: AtomicBool::new(false),
        }
    }

    async fn ausfuehren(&self) {
        if self.entfernt.swap(true, Ordering::AcqRel) {
            return;
        }
        self.kontext.registry.entfernen(&self.handle);
        self.kontext.notifier.ankuendigen().await;
        self.angekuendigt.store(true, Ordering::Release);
    }
}

impl Drop for Abmeldung {
    fn drop(&mut self) {
        // Beendet auch den Writer-Task, wenn die Session mitten in der
        // Abmeldung abgebrochen wurde
        self.handle.schliessen();

        if !self.entfernt.swap(true, Ordering::AcqRel) {
            self.kontext.registry.entfernen(&self.handle);
        }
        if self.angekuendigt.swap(true, Ordering::AcqRel) {
            return;
        }

        tracing::warn!(
            verbindung = %self.handle.verbindung_id(),
            username = %self.handle.username(),
            "Session abgebrochen – Abmeldung nachgeholt"
        );
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                let notifier = self.kontext.notifier.clone();
                rt.spawn(async move {
                    notifier.ankuendigen().await;
                });
            }
            Err(_) => {
                tracing::warn!("Keine Runtime aktiv – Roster-Ankuendigung entfaellt");
            }
        }
    }
}
