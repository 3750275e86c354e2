//! ClientHandle – Identitaet und Ausgangs-Queue einer Verbindung
//!
//! Ein Handle wird nach erfolgreicher Authentifizierung erstellt und gehoert
//! der `ConnectionSession`. Registry, Broadcast-Engine und Notifier halten
//! nur `Arc`-Referenzen und schreiben ausschliesslich ueber `senden`.

use std::sync::Arc;
use std::time::Duration;

use holler_core::{ConnectionId, Identitaet};
use holler_protocol::Frame;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio_util::sync::CancellationToken;

use crate::error::{RelayError, RelayResult};

/// Frames die als Einheit in die Queue gelegt werden
///
/// Speaker-Ankuendigung und Payload landen so immer direkt hintereinander
/// beim Empfaenger, auch wenn mehrere Sprecher gleichzeitig senden.
pub type Sendung = Vec<Frame>;

// ---------------------------------------------------------------------------
// ClientHandle
// ---------------------------------------------------------------------------

/// Handle auf einen verbundenen Client
#[derive(Debug)]
pub struct ClientHandle {
    verbindung_id: ConnectionId,
    identitaet: Identitaet,
    ausgang: mpsc::Sender<Sendung>,
    /// Signalisiert das Schliessen des darunterliegenden Streams
    stream_geschlossen: CancellationToken,
}

impl ClientHandle {
    /// Erstellt ein Handle mit frischer `ConnectionId`
    ///
    /// Der Receiver gehoert dem Writer-Task der Verbindung.
    pub fn neu(identitaet: Identitaet, queue_groesse: usize) -> (Arc<Self>, mpsc::Receiver<Sendung>) {
        let (tx, rx) = mpsc::channel(queue_groesse.max(1));
        let handle = Arc::new(Self {
            verbindung_id: ConnectionId::new(),
            identitaet,
            ausgang: tx,
            stream_geschlossen: CancellationToken::new(),
        });
        (handle, rx)
    }

    pub fn verbindung_id(&self) -> ConnectionId {
        self.verbindung_id
    }

    pub fn identitaet(&self) -> &Identitaet {
        &self.identitaet
    }

    pub fn username(&self) -> &str {
        &self.identitaet.username
    }

    /// Reiht eine Sendung ein, wartet hoechstens `zeitlimit`
    ///
    /// Laeuft das Zeitlimit ab, wird das Handle geschlossen: ein Empfaenger
    /// der nicht mehr nachkommt wird getrennt statt den Sprecher aufzuhalten.
    pub async fn senden(&self, sendung: Sendung, zeitlimit: Duration) -> RelayResult<()> {
        if self.ist_geschlossen() {
            return Err(RelayError::VerbindungGeschlossen);
        }

        match self.ausgang.send_timeout(sendung, zeitlimit).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!(
                    verbindung = %self.verbindung_id,
                    username = %self.identitaet.username,
                    zeitlimit_ms = zeitlimit.as_millis() as u64,
                    "Send-Queue voll – langsamer Empfaenger wird getrennt"
                );
                self.schliessen();
                Err(RelayError::SendeTimeout(zeitlimit.as_millis() as u64))
            }
            Err(SendTimeoutError::Closed(_)) => {
                tracing::debug!(
                    verbindung = %self.verbindung_id,
                    "Send-Queue geschlossen (Client getrennt)"
                );
                Err(RelayError::VerbindungGeschlossen)
            }
        }
    }

    /// Einzelnen Frame senden
    pub async fn frame_senden(&self, frame: Frame, zeitlimit: Duration) -> RelayResult<()> {
        self.senden(vec![frame], zeitlimit).await
    }

    /// Schliesst den Stream; mehrfacher Aufruf ist wirkungslos
    pub fn schliessen(&self) {
        self.stream_geschlossen.cancel();
    }

    pub fn ist_geschlossen(&self) -> bool {
        self.stream_geschlossen.is_cancelled()
    }

    /// Wartet bis der Stream geschlossen wurde
    pub async fn geschlossen(&self) {
        self.stream_geschlossen.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holler_core::UserId;

    fn identitaet(name: &str) -> Identitaet {
        Identitaet::neu(UserId::new(), name)
    }

    #[tokio::test]
    async fn sendung_kommt_in_reihenfolge_an() {
        let (handle, mut rx) = ClientHandle::neu(identitaet("alice"), 4);
        handle
            .senden(
                vec![Frame::Text("a".into()), Frame::binaer(vec![1u8])],
                Duration::from_millis(50),
            )
            .await
            .unwrap();

        let sendung = rx.recv().await.unwrap();
        assert_eq!(sendung, vec![Frame::Text("a".into()), Frame::binaer(vec![1u8])]);
    }

    #[tokio::test]
    async fn volle_queue_schliesst_handle() {
        let (handle, _rx) = ClientHandle::neu(identitaet("langsam"), 1);
        handle
            .frame_senden(Frame::Schliessen, Duration::from_millis(10))
            .await
            .unwrap();

        let err = handle
            .frame_senden(Frame::Schliessen, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::SendeTimeout(10)));
        assert!(handle.ist_geschlossen());

        // Weitere Sendungen scheitern sofort
        assert!(matches!(
            handle.frame_senden(Frame::Schliessen, Duration::from_millis(10)).await,
            Err(RelayError::VerbindungGeschlossen)
        ));
    }

    #[tokio::test]
    async fn schliessen_ist_idempotent() {
        let (handle, _rx) = ClientHandle::neu(identitaet("bob"), 1);
        handle.schliessen();
        handle.schliessen();
        assert!(handle.ist_geschlossen());
        handle.geschlossen().await;
    }

    #[test]
    fn jede_verbindung_bekommt_eigene_id() {
        let (a, _) = ClientHandle::neu(identitaet("alice"), 1);
        let (b, _) = ClientHandle::neu(identitaet("alice"), 1);
        assert_ne!(a.verbindung_id(), b.verbindung_id());
        assert_eq!(a.username(), b.username());
    }
}
