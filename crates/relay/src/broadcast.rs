//! Broadcast-Engine – Audio-Segmente protokollieren und verteilen
//!
//! Jedes Binaer-Frame eines Sprechers wird zuerst an das `AudioLog` gehaengt
//! und dann an alle anderen registrierten Clients verteilt. Pro Empfaenger
//! geht eine Sendung aus Speaker-Ankuendigung und Payload in die Queue.
//!
//! Die Engine wird aus der Leseschleife der sendenden Session heraus
//! aufgerufen und erst nach Abschluss des Fan-outs verlassen. Dadurch bleibt
//! die Reihenfolge pro Sprecher bei allen Empfaengern erhalten.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::join_all;
use holler_core::AudioLog;
use holler_protocol::{ControlFrame, Frame};

use crate::handle::ClientHandle;
use crate::hub::RelayKonfig;
use crate::registry::ClientRegistry;

/// Ergebnis eines Fan-outs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutBericht {
    /// Segment wurde im AudioLog gespeichert
    pub persistiert: bool,
    /// Empfaenger, bei denen die Sendung eingereiht wurde
    pub zugestellt: usize,
    /// Empfaenger, bei denen das Einreihen scheiterte
    pub fehlgeschlagen: usize,
    /// Frame wurde wegen Ueberlaenge verworfen
    pub verworfen: bool,
}

/// Verteilt Audio-Segmente an alle Clients ausser dem Sprecher
#[derive(Clone)]
pub struct BroadcastEngine {
    registry: Arc<ClientRegistry>,
    audio_log: Arc<dyn AudioLog>,
    schreib_timeout: Duration,
    max_payload_bytes: usize,
}

impl BroadcastEngine {
    pub fn neu(
        registry: Arc<ClientRegistry>,
        audio_log: Arc<dyn AudioLog>,
        konfig: &RelayKonfig,
    ) -> Self {
        Self {
            registry,
            audio_log,
            schreib_timeout: konfig.schreib_timeout(),
            max_payload_bytes: konfig.max_payload_bytes,
        }
    }

    /// Verarbeitet ein eingehendes Audio-Segment von `sender`
    ///
    /// Fehler beim Speichern oder bei einzelnen Empfaengern werden geloggt
    /// und gezaehlt, aber nie an den Sprecher weitergegeben.
    pub async fn frame_verarbeiten(&self, sender: &ClientHandle, payload: Bytes) -> FanoutBericht {
        if payload.len() > self.max_payload_bytes {
            tracing::warn!(
                verbindung = %sender.verbindung_id(),
                username = %sender.username(),
                groesse = payload.len(),
                max = self.max_payload_bytes,
                "Audio-Frame zu gross – verworfen"
            );
            return FanoutBericht {
                verworfen: true,
                ..FanoutBericht::default()
            };
        }

        let persistiert = match self.audio_log.anhaengen(sender.identitaet(), &payload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    username = %sender.username(),
                    fehler = %e,
                    "Audio-Segment konnte nicht gespeichert werden – wird trotzdem verteilt"
                );
                false
            }
        };

        let speaker = match Frame::steuerung(&ControlFrame::speaker(sender.username())) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(fehler = %e, "Speaker-Frame nicht kodierbar");
                return FanoutBericht {
                    persistiert,
                    ..FanoutBericht::default()
                };
            }
        };

        let empfaenger: Vec<_> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|h| h.verbindung_id() != sender.verbindung_id())
            .collect();

        // Empfaenger parallel bedienen: ein voller Empfaenger kostet
        // hoechstens ein Zeitlimit, nicht eines pro Empfaenger
        let ergebnisse = join_all(empfaenger.iter().map(|handle| {
            let sendung = vec![speaker.clone(), Frame::Binaer(payload.clone())];
            handle.senden(sendung, self.schreib_timeout)
        }))
        .await;

        let mut bericht = FanoutBericht {
            persistiert,
            ..FanoutBericht::default()
        };
        for (handle, ergebnis) in empfaenger.iter().zip(ergebnisse) {
            match ergebnis {
                Ok(()) => bericht.zugestellt += 1,
                Err(e) => {
                    bericht.fehlgeschlagen += 1;
                    tracing::debug!(
                        verbindung = %handle.verbindung_id(),
                        fehler = %e,
                        "Zustellung an Empfaenger fehlgeschlagen"
                    );
                }
            }
        }

        tracing::trace!(
            username = %sender.username(),
            groesse = payload.len(),
            zugestellt = bericht.zugestellt,
            fehlgeschlagen = bericht.fehlgeschlagen,
            "Audio-Frame verteilt"
        );
        bericht
    }
}
