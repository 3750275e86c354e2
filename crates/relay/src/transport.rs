//! Transport-Abstraktion fuer Sessions
//!
//! Eine Verbindung besteht aus einer Lese- und einer Schreibhaelfte. Die
//! Leseseite gehoert der Session-Schleife, die Schreibseite dem Writer-Task.
//! Implementierungen: WebSocket (Server-Crate), TCP (`crate::tcp`) und der
//! Kanal-Transport in diesem Modul fuer Tests und In-Process-Clients.

use async_trait::async_trait;
use holler_protocol::Frame;
use tokio::sync::mpsc;

use crate::error::{RelayError, RelayResult};

/// Leseseite einer Verbindung
#[async_trait]
pub trait FrameQuelle: Send {
    /// Naechster Frame; `Ok(None)` wenn die Gegenstelle den Stream beendet hat
    async fn frame_lesen(&mut self) -> RelayResult<Option<Frame>>;
}

/// Schreibseite einer Verbindung
#[async_trait]
pub trait FrameSenke: Send {
    async fn frame_schreiben(&mut self, frame: Frame) -> RelayResult<()>;

    /// Schliesst den Stream; weitere Schreibversuche schlagen fehl
    async fn schliessen(&mut self) -> RelayResult<()>;
}

// ---------------------------------------------------------------------------
// Kanal-Transport
// ---------------------------------------------------------------------------

pub struct KanalQuelle {
    rx: mpsc::Receiver<Frame>,
}

#[async_trait]
impl FrameQuelle for KanalQuelle {
    async fn frame_lesen(&mut self) -> RelayResult<Option<Frame>> {
        Ok(self.rx.recv().await)
    }
}

pub struct KanalSenke {
    tx: Option<mpsc::Sender<Frame>>,
}

#[async_trait]
impl FrameSenke for KanalSenke {
    async fn frame_schreiben(&mut self, frame: Frame) -> RelayResult<()> {
        let tx = self.tx.as_ref().ok_or(RelayError::VerbindungGeschlossen)?;
        tx.send(frame)
            .await
            .map_err(|_| RelayError::VerbindungGeschlossen)
    }

    async fn schliessen(&mut self) -> RelayResult<()> {
        self.tx = None;
        Ok(())
    }
}

/// Client-Seite einer Kanal-Verbindung
pub struct Gegenstelle {
    /// Frames an den Hub
    pub tx: mpsc::Sender<Frame>,
    /// Frames vom Hub; `None` sobald der Hub geschlossen hat
    pub rx: mpsc::Receiver<Frame>,
}

impl Gegenstelle {
    pub async fn senden(&self, frame: Frame) -> RelayResult<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| RelayError::VerbindungGeschlossen)
    }

    pub async fn empfangen(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

/// Erstellt eine In-Process-Verbindung
///
/// Gibt die Hub-Seite (Quelle, Senke) und die Client-Seite zurueck.
pub fn speicher_verbindung(kapazitaet: usize) -> (KanalQuelle, KanalSenke, Gegenstelle) {
    let (zum_hub_tx, zum_hub_rx) = mpsc::channel(kapazitaet);
    let (vom_hub_tx, vom_hub_rx) = mpsc::channel(kapazitaet);
    (
        KanalQuelle { rx: zum_hub_rx },
        KanalSenke {
            tx: Some(vom_hub_tx),
        },
        Gegenstelle {
            tx: zum_hub_tx,
            rx: vom_hub_rx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn kanal_verbindung_in_beide_richtungen() {
        let (mut quelle, mut senke, mut client) = speicher_verbindung(4);

        client.senden(Frame::binaer(vec![1u8, 2])).await.unwrap();
        assert_eq!(
            quelle.frame_lesen().await.unwrap(),
            Some(Frame::binaer(vec![1u8, 2]))
        );

        senke.frame_schreiben(Frame::Text("hi".into())).await.unwrap();
        assert_eq!(client.empfangen().await, Some(Frame::Text("hi".into())));

        senke.schliessen().await.unwrap();
        assert_eq!(client.empfangen().await, None);
        assert!(senke.frame_schreiben(Frame::Schliessen).await.is_err());

        drop(client);
        assert_eq!(quelle.frame_lesen().await.unwrap(), None);
    }
}
