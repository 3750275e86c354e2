//! Wire-Format fuer rohe TCP-Verbindungen
//!
//! Frame-basiertes Protokoll: Art(u8) + Laenge(u32 big-endian) + Payload.
//!
//! ## Frame-Format
//!
//! ```text
//! +------+--------+--------+--------+--------+----...----+
//! | Art  | Laenge (u32 BE)                   | Payload    |
//! +------+--------+--------+--------+--------+----...----+
//! ```
//!
//! Art: `0x01` Binaer, `0x02` Text (UTF-8), `0x03` Schliessen (Laenge 0).
//! Unbekannte Arten werden vollstaendig konsumiert und als [`Frame::Sonstig`]
//! geliefert, damit neuere Clients aeltere Server nicht abschiessen.

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{Frame, FrameArt};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-maximale Frame-Groesse (1 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Groesse des Headers (Art + Laenge) in Bytes
pub const HEADER_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// FrameCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer frame-basierte TCP-Verbindungen
///
/// ```rust,no_run
/// use tokio_util::codec::Framed;
/// use holler_protocol::wire::FrameCodec;
///
/// // let stream = TcpStream::connect(...).await?;
/// // let framed = Framed::new(stream, FrameCodec::new());
/// ```
#[derive(Debug, Clone)]
pub struct FrameCodec {
    /// Maximale erlaubte Payload-Groesse in Bytes
    max_frame_size: usize,
}

impl FrameCodec {
    /// Erstellt einen neuen `FrameCodec` mit Standard-Limits
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Erstellt einen `FrameCodec` mit benutzerdefinierter maximaler Frame-Groesse
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn zu_gross(&self, laenge: usize) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                laenge, self.max_frame_size
            ),
        )
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Decoder-Implementierung
// ---------------------------------------------------------------------------

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let art = src[0];
        let laenge = u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;

        if laenge > self.max_frame_size {
            return Err(self.zu_gross(laenge));
        }

        let total_size = HEADER_SIZE + laenge;
        if src.len() < total_size {
            src.reserve(total_size - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let payload = src.split_to(laenge).freeze();

        let frame = match FrameArt::aus_byte(art) {
            Some(FrameArt::Binaer) => Frame::Binaer(payload),
            Some(FrameArt::Text) => {
                let text = String::from_utf8(payload.to_vec()).map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Text-Frame ist kein UTF-8: {e}"),
                    )
                })?;
                Frame::Text(text)
            }
            Some(FrameArt::Schliessen) => Frame::Schliessen,
            None => Frame::Sonstig,
        };

        Ok(Some(frame))
    }
}

// ---------------------------------------------------------------------------
// Encoder-Implementierung
// ---------------------------------------------------------------------------

impl Encoder<Frame> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (art, payload): (FrameArt, &[u8]) = match &item {
            Frame::Binaer(b) => (FrameArt::Binaer, b.as_ref()),
            Frame::Text(t) => (FrameArt::Text, t.as_bytes()),
            Frame::Schliessen => (FrameArt::Schliessen, &[]),
            Frame::Sonstig => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Sonstig-Frames werden nicht gesendet",
                ))
            }
        };

        if payload.len() > self.max_frame_size {
            return Err(self.zu_gross(payload.len()));
        }

        dst.reserve(HEADER_SIZE + payload.len());
        dst.put_u8(art as u8);
        dst.put_u32(payload.len() as u32);
        dst.put_slice(payload);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
