//! WebSocket-Endpunkt und Transport-Adapter
//!
//! `GET /ws?username=<name>` wird immer upgegradet. Ob der Name bekannt ist,
//! entscheidet danach die `ConnectionSession`: unbekannte Namen bekommen
//! direkt einen Close-Frame und tauchen nie im Roster auf.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use holler_protocol::Frame;
use holler_relay::{ConnectionSession, FrameQuelle, FrameSenke, RelayError, RelayResult};
use serde::Deserialize;

use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub username: String,
}

/// GET /ws?username=<name>
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.max_message_size(state.hub.konfig.max_payload_bytes.saturating_mul(2))
        .on_upgrade(move |socket| async move {
            let (senke, quelle) = socket.split();
            let peer = format!("ws:{}", query.username);
            let ergebnis = ConnectionSession::neu(state.hub, peer)
                .ausfuehren(&query.username, WsQuelle { inner: quelle }, WsSenke { inner: senke })
                .await;
            tracing::debug!(username = %query.username, ergebnis = ?ergebnis, "WebSocket-Session beendet");
        })
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct WsQuelle {
    inner: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameQuelle for WsQuelle {
    async fn frame_lesen(&mut self) -> RelayResult<Option<Frame>> {
        let frame = match self.inner.next().await {
            None => return Ok(None),
            Some(Err(e)) => return Err(RelayError::transport(e.to_string())),
            Some(Ok(Message::Binary(daten))) => Frame::Binaer(Bytes::from(daten)),
            Some(Ok(Message::Text(text))) => Frame::Text(text),
            Some(Ok(Message::Close(_))) => Frame::Schliessen,
            // Pings beantwortet axum selbst
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => Frame::Sonstig,
        };
        Ok(Some(frame))
    }
}

pub struct WsSenke {
    inner: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl FrameSenke for WsSenke {
    async fn frame_schreiben(&mut self, frame: Frame) -> RelayResult<()> {
        let nachricht = match frame {
            Frame::Binaer(daten) => Message::Binary(daten.to_vec()),
            Frame::Text(text) => Message::Text(text),
            Frame::Schliessen => Message::Close(None),
            Frame::Sonstig => return Ok(()),
        };
        self.inner
            .send(nachricht)
            .await
            .map_err(|e| RelayError::transport(e.to_string()))
    }

    async fn schliessen(&mut self) -> RelayResult<()> {
        let _ = self.inner.send(Message::Close(None)).await;
        self.inner
            .close()
            .await
            .map_err(|e| RelayError::transport(e.to_string()))
    }
}
