//! Transport-Frames
//!
//! Abstraktion ueber die Frame-Arten einer bidirektionalen Verbindung,
//! unabhaengig davon ob darunter WebSocket oder rohes TCP liegt.

use bytes::Bytes;

use crate::control::ControlFrame;

/// Art eines Frames auf dem Draht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameArt {
    Binaer = 0x01,
    Text = 0x02,
    Schliessen = 0x03,
}

impl FrameArt {
    /// Unbekannte Bytes ergeben `None`
    pub fn aus_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::Binaer),
            0x02 => Some(Self::Text),
            0x03 => Some(Self::Schliessen),
            _ => None,
        }
    }
}

/// Ein einzelner Frame einer Relay-Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Rohes Audio-Segment
    Binaer(Bytes),
    /// Text, in der Regel ein JSON-Control-Frame
    Text(String),
    /// Gegenseite beendet die Verbindung
    Schliessen,
    /// Transportspezifischer Frame ohne Bedeutung fuer den Relay
    /// (WebSocket Ping/Pong, unbekannte TCP-Frame-Arten)
    Sonstig,
}

impl Frame {
    /// Baut einen Text-Frame aus einem Control-Frame
    pub fn steuerung(control: &ControlFrame) -> Result<Self, serde_json::Error> {
        control.kodieren().map(Self::Text)
    }

    pub fn binaer(payload: impl Into<Bytes>) -> Self {
        Self::Binaer(payload.into())
    }

    pub fn ist_binaer(&self) -> bool {
        matches!(self, Self::Binaer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_art_bytes() {
        assert_eq!(FrameArt::aus_byte(0x01), Some(FrameArt::Binaer));
        assert_eq!(FrameArt::aus_byte(0x02), Some(FrameArt::Text));
        assert_eq!(FrameArt::aus_byte(0x03), Some(FrameArt::Schliessen));
        assert_eq!(FrameArt::aus_byte(0x7f), None);
        assert_eq!(FrameArt::Text as u8, 0x02);
    }

    #[test]
    fn steuerung_ergibt_text_frame() {
        let frame = Frame::steuerung(&ControlFrame::speaker("bob")).unwrap();
        assert_eq!(
            frame,
            Frame::Text(r#"{"type":"speaker","username":"bob"}"#.into())
        );
        assert!(!frame.ist_binaer());
    }
}
