//! TCP-Transport – Rohe Relay-Verbindungen ohne HTTP
//!
//! Der `TcpRelayServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ConnectionSession`. Frames laufen ueber den laengen-praefixierten
//! `FrameCodec`.
//!
//! ## Anmeldung
//! Der erste Frame einer Verbindung muss ein Text-Frame mit dem
//! Benutzernamen sein. Danach gelten dieselben Regeln wie bei `/ws`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use holler_protocol::{wire::DEFAULT_MAX_FRAME_SIZE, Frame, FrameCodec};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::watch;
use tokio_util::codec::Framed;

use crate::error::RelayResult;
use crate::hub::HubKontext;
use crate::session::ConnectionSession;
use crate::transport::{FrameQuelle, FrameSenke};

/// Zeit fuer den Anmelde-Frame nach dem Verbindungsaufbau
const ANMELDE_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Quelle / Senke
// ---------------------------------------------------------------------------

pub struct TcpQuelle<T = TcpStream> {
    inner: SplitStream<Framed<T, FrameCodec>>,
}

pub struct TcpSenke<T = TcpStream> {
    inner: SplitSink<Framed<T, FrameCodec>, Frame>,
}

/// Teilt einen Byte-Stream in Lese- und Schreibseite
pub fn aufteilen<T>(stream: T, codec: FrameCodec) -> (TcpQuelle<T>, TcpSenke<T>)
where
    T: AsyncRead + AsyncWrite,
{
    let (senke, quelle) = Framed::new(stream, codec).split();
    (TcpQuelle { inner: quelle }, TcpSenke { inner: senke })
}

#[async_trait]
impl<T> FrameQuelle for TcpQuelle<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn frame_lesen(&mut self) -> RelayResult<Option<Frame>> {
        Ok(self.inner.next().await.transpose()?)
    }
}

#[async_trait]
impl<T> FrameSenke for TcpSenke<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn frame_schreiben(&mut self, frame: Frame) -> RelayResult<()> {
        self.inner.send(frame).await?;
        Ok(())
    }

    async fn schliessen(&mut self) -> RelayResult<()> {
        // Close-Frame ist Hoeflichkeit; der Stream wird in jedem Fall geschlossen
        let _ = self.inner.send(Frame::Schliessen).await;
        self.inner.close().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TcpRelayServer
// ---------------------------------------------------------------------------

/// TCP-Listener fuer Relay-Verbindungen
pub struct TcpRelayServer {
    kontext: Arc<HubKontext>,
    listener: TcpListener,
}

impl TcpRelayServer {
    /// Bindet den Socket; Port 0 waehlt einen freien Port
    pub async fn binden(kontext: Arc<HubKontext>, adresse: impl ToSocketAddrs) -> std::io::Result<Self> {
        let listener = TcpListener::bind(adresse).await?;
        Ok(Self { kontext, listener })
    }

    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Akzeptiert Verbindungen bis `shutdown_rx` `true` meldet
    pub async fn starten(self, mut shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
        tracing::info!(adresse = %self.listener.local_addr()?, "TCP-Relay gestartet");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            tracing::debug!(peer = %peer, "TCP-Verbindung akzeptiert");
                            let kontext = Arc::clone(&self.kontext);
                            tokio::spawn(verbindung_bedienen(kontext, stream, peer));
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                }

                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("TCP-Relay: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP-Relay gestoppt");
        Ok(())
    }
}

async fn verbindung_bedienen(kontext: Arc<HubKontext>, stream: TcpStream, peer: SocketAddr) {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(peer = %peer, fehler = %e, "TCP_NODELAY nicht gesetzt");
    }

    // Etwas Luft ueber dem Payload-Limit, damit zu grosse Frames verworfen
    // statt als Protokollfehler behandelt werden
    let max_frame = kontext
        .konfig
        .max_payload_bytes
        .saturating_mul(2)
        .max(DEFAULT_MAX_FRAME_SIZE);
    let (mut quelle, mut senke) = aufteilen(stream, FrameCodec::with_max_size(max_frame));

    let token = match tokio::time::timeout(ANMELDE_TIMEOUT, quelle.frame_lesen()).await {
        Ok(Ok(Some(Frame::Text(name)))) => name.trim().to_string(),
        Ok(Ok(anderes)) => {
            tracing::info!(peer = %peer, frame = ?anderes, "Kein Anmelde-Frame – Verbindung geschlossen");
            let _ = senke.schliessen().await;
            return;
        }
        Ok(Err(e)) => {
            tracing::debug!(peer = %peer, fehler = %e, "Lesefehler vor der Anmeldung");
            return;
        }
        Err(_) => {
            tracing::info!(peer = %peer, "Anmelde-Timeout");
            let _ = senke.schliessen().await;
            return;
        }
    };

    let ergebnis = ConnectionSession::neu(kontext, peer.to_string())
        .ausfuehren(&token, quelle, senke)
        .await;
    tracing::debug!(peer = %peer, ergebnis = ?ergebnis, "TCP-Session beendet");
}
