//! End-to-End-Szenario ueber In-Process-Verbindungen
//!
//! alice und bob verbinden sich, alice spricht, bob geht wieder.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use holler_core::{AudioLog, AuthStore, HollerError, Identitaet, UserId};
use holler_protocol::Frame;
use holler_relay::{
    speicher_verbindung, ConnectionSession, Gegenstelle, HubKontext, RelayKonfig,
    SitzungsErgebnis, TrennungsGrund,
};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

const WARTEZEIT: Duration = Duration::from_secs(2);

struct Benutzerliste(HashMap<String, Identitaet>);

#[async_trait]
impl AuthStore for Benutzerliste {
    async fn aufloesen(&self, token: &str) -> holler_core::Result<Option<Identitaet>> {
        Ok(self.0.get(token).cloned())
    }
}

#[derive(Default)]
struct Protokoll {
    segmente: Mutex<Vec<Vec<u8>>>,
    kaputt: bool,
}

#[async_trait]
impl AudioLog for Protokoll {
    async fn anhaengen(&self, _identitaet: &Identitaet, payload: &[u8]) -> holler_core::Result<()> {
        if self.kaputt {
            return Err(HollerError::persistenz("schreibgeschuetzt"));
        }
        self.segmente.lock().push(payload.to_vec());
        Ok(())
    }
}

fn hub(log: Arc<Protokoll>) -> Arc<HubKontext> {
    let benutzer = ["alice", "bob"]
        .into_iter()
        .map(|n| (n.to_string(), Identitaet::neu(UserId::new(), n)))
        .collect();
    HubKontext::neu(RelayKonfig::default(), Arc::new(Benutzerliste(benutzer)), log)
}

fn verbinden(hub: &Arc<HubKontext>, name: &str) -> (JoinHandle<SitzungsErgebnis>, Gegenstelle) {
    let (quelle, senke, client) = speicher_verbindung(16);
    let hub = Arc::clone(hub);
    let name = name.to_string();
    let task = tokio::spawn(async move {
        ConnectionSession::neu(hub, format!("mem:{name}"))
            .ausfuehren(&name, quelle, senke)
            .await
    });
    (task, client)
}

async fn naechster(client: &mut Gegenstelle) -> Frame {
    tokio::time::timeout(WARTEZEIT, client.empfangen())
        .await
        .expect("Zeitueberschreitung")
        .expect("Verbindung unerwartet geschlossen")
}

fn text(json: &str) -> Frame {
    Frame::Text(json.to_string())
}

#[tokio::test]
async fn alice_spricht_bob_hoert() {
    let log = Arc::new(Protokoll::default());
    let hub = hub(Arc::clone(&log));

    let (_alice_task, mut alice) = verbinden(&hub, "alice");
    assert_eq!(
        naechster(&mut alice).await,
        text(r#"{"type":"participants","participants":["alice"]}"#)
    );

    let (bob_task, mut bob) = verbinden(&hub, "bob");
    let roster_beide = text(r#"{"type":"participants","participants":["alice","bob"]}"#);
    assert_eq!(naechster(&mut bob).await, roster_beide);
    assert_eq!(naechster(&mut alice).await, roster_beide);

    alice
        .senden(Frame::binaer(vec![0xDE, 0xAD, 0xBE, 0xEF]))
        .await
        .unwrap();
    assert_eq!(
        naechster(&mut bob).await,
        text(r#"{"type":"speaker","username":"alice"}"#)
    );
    assert_eq!(
        naechster(&mut bob).await,
        Frame::binaer(vec![0xDE, 0xAD, 0xBE, 0xEF])
    );

    // bob trennt die Verbindung
    drop(bob);
    match bob_task.await.unwrap() {
        SitzungsErgebnis::Beendet { identitaet, grund, .. } => {
            assert_eq!(identitaet.username, "bob");
            assert_eq!(grund, TrennungsGrund::StreamBeendet);
        }
        anderes => panic!("unerwartet: {anderes:?}"),
    }

    // alice bekommt ihr eigenes Audio nie zurueck, nur den neuen Roster
    assert_eq!(
        naechster(&mut alice).await,
        text(r#"{"type":"participants","participants":["alice"]}"#)
    );
    assert_eq!(log.segmente.lock().as_slice(), &[vec![0xDE, 0xAD, 0xBE, 0xEF]]);
    assert_eq!(hub.online_anzahl(), 1);
}

#[tokio::test]
async fn verteilung_trotz_kaputtem_audio_log() {
    let log = Arc::new(Protokoll {
        kaputt: true,
        ..Protokoll::default()
    });
    let hub = hub(log);

    let (_alice_task, mut alice) = verbinden(&hub, "alice");
    naechster(&mut alice).await;
    let (_bob_task, mut bob) = verbinden(&hub, "bob");
    naechster(&mut bob).await;
    naechster(&mut alice).await;

    alice.senden(Frame::binaer(&b"eins"[..])).await.unwrap();
    alice.senden(Frame::binaer(&b"zwei"[..])).await.unwrap();

    let mut payloads = Vec::new();
    while payloads.len() < 2 {
        if let Frame::Binaer(b) = naechster(&mut bob).await {
            payloads.push(b);
        }
    }
    assert_eq!(payloads, [&b"eins"[..], &b"zwei"[..]]);
}
