//! Membership-Notifier – Teilnehmerliste an alle Clients senden
//!
//! Der Roster wird bei jedem Beitritt und jedem Austritt komplett neu aus
//! einem Registry-Snapshot berechnet, nie inkrementell.
//!
//! Snapshot und Einreihen laufen unter einer gemeinsamen Sperre. Damit
//! erreichen Ankuendigungen jeden Client in der Reihenfolge ihrer Snapshots,
//! und der zuletzt empfangene Roster entspricht dem letzten Registry-Stand.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use holler_protocol::{ControlFrame, Frame};
use tokio::sync::Mutex;

use crate::registry::ClientRegistry;

#[derive(Clone)]
pub struct MembershipNotifier {
    registry: Arc<ClientRegistry>,
    schreib_timeout: Duration,
    /// Reiht Ankuendigungen hintereinander; die Registry-Sperre bleibt frei
    reihenfolge: Arc<Mutex<()>>,
}

impl MembershipNotifier {
    pub fn neu(registry: Arc<ClientRegistry>, schreib_timeout: Duration) -> Self {
        Self {
            registry,
            schreib_timeout,
            reihenfolge: Arc::new(Mutex::new(())),
        }
    }

    /// Sendet den aktuellen Roster an alle registrierten Clients
    ///
    /// Gibt die verschickte Teilnehmerliste zurueck.
    pub async fn ankuendigen(&self) -> Vec<String> {
        // Haelt hoechstens ein Schreib-Zeitlimit lang
        let _reihe = self.reihenfolge.lock().await;

        let handles = self.registry.snapshot();
        let roster: Vec<String> = handles.iter().map(|h| h.username().to_string()).collect();

        let frame = match Frame::steuerung(&ControlFrame::participants(roster.clone())) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(fehler = %e, "Participants-Frame nicht kodierbar");
                return roster;
            }
        };

        let ergebnisse = join_all(
            handles
                .iter()
                .map(|h| h.frame_senden(frame.clone(), self.schreib_timeout)),
        )
        .await;

        let fehlgeschlagen = ergebnisse.iter().filter(|r| r.is_err()).count();
        tracing::debug!(
            teilnehmer = roster.len(),
            fehlgeschlagen,
            "Teilnehmerliste verschickt"
        );
        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ClientHandle;
    use crate::testhilfe::{empfangen, handle};
    use holler_core::{Identitaet, UserId};

    fn participants(namen: &[&str]) -> Frame {
        Frame::steuerung(&ControlFrame::participants(
            namen.iter().map(|n| n.to_string()).collect(),
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn roster_nach_beitritt_und_austritt() {
        let registry = Arc::new(ClientRegistry::neu());
        let notifier = MembershipNotifier::neu(Arc::clone(&registry), Duration::from_millis(50));

        let (alice, mut rx_alice) = handle("alice");
        registry.hinzufuegen(alice);
        assert_eq!(notifier.ankuendigen().await, ["alice"]);
        assert_eq!(empfangen(&mut rx_alice), vec![participants(&["alice"])]);

        let (bob, mut rx_bob) = handle("bob");
        registry.hinzufuegen(bob.clone());
        assert_eq!(notifier.ankuendigen().await, ["alice", "bob"]);
        assert_eq!(empfangen(&mut rx_alice), vec![participants(&["alice", "bob"])]);
        assert_eq!(empfangen(&mut rx_bob), vec![participants(&["alice", "bob"])]);

        registry.entfernen(&bob);
        assert_eq!(notifier.ankuendigen().await, ["alice"]);
        assert_eq!(empfangen(&mut rx_alice), vec![participants(&["alice"])]);
        assert!(empfangen(&mut rx_bob).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn letzter_roster_nach_gleichzeitigen_wechseln_ist_aktuell() {
        let registry = Arc::new(ClientRegistry::neu());
        let notifier = MembershipNotifier::neu(Arc::clone(&registry), Duration::from_secs(1));

        // Grosser Raum, damit sich Snapshot und Einreihen ueberlappen
        let mut stamm = Vec::new();
        for i in 0..500 {
            let (h, rx) = ClientHandle::neu(Identitaet::neu(UserId::new(), format!("s{i}")), 64);
            registry.hinzufuegen(h);
            stamm.push(rx);
        }
        let (beobachter, mut rx_beobachter) =
            ClientHandle::neu(Identitaet::neu(UserId::new(), "obs"), 64);
        registry.hinzufuegen(beobachter);

        let aufgaben: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    let (gast, _) = handle(&format!("c{i}"));
                    registry.hinzufuegen(gast.clone());
                    notifier.ankuendigen().await;
                    registry.entfernen(&gast);
                    notifier.ankuendigen().await;
                })
            })
            .collect();
        for aufgabe in aufgaben {
            aufgabe.await.unwrap();
        }

        let letzter = empfangen(&mut rx_beobachter)
            .into_iter()
            .last()
            .expect("mindestens ein Roster");
        let roster = match letzter {
            Frame::Text(text) => match ControlFrame::dekodieren(&text).unwrap() {
                ControlFrame::Participants { participants } => participants,
                anderer => panic!("Roster erwartet: {anderer:?}"),
            },
            anderer => panic!("Text-Frame erwartet: {anderer:?}"),
        };
        assert_eq!(roster.len(), 501);
        assert!(roster.iter().all(|n| !n.starts_with('c')), "veraltet: {roster:?}");
        assert_eq!(roster.last().map(String::as_str), Some("obs"));
    }

    #[tokio::test]
    async fn leere_registry() {
        let notifier = MembershipNotifier::neu(Arc::new(ClientRegistry::neu()), Duration::ZERO);
        assert!(notifier.ankuendigen().await.is_empty());
    }
}
