//! Control-Frames (JSON)
//!
//! Der Server erzeugt genau zwei Formen:
//!
//! ```text
//! {"type":"speaker","username":"alice"}
//! {"type":"participants","participants":["alice","bob"]}
//! ```
//!
//! Unbekannte `type`-Werte werden beim Dekodieren zu [`ControlFrame::Unbekannt`]
//! und muessen von Empfaengern ignoriert werden.

use serde::{Deserialize, Serialize};

/// Strukturierte Nicht-Audio-Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlFrame {
    /// Kuendigt den Absender des unmittelbar folgenden Binaer-Frames an
    Speaker { username: String },
    /// Vollstaendige Teilnehmerliste zum Zeitpunkt des Versands
    Participants { participants: Vec<String> },
    /// Vorwaertskompatibel: jeder andere `type`
    #[serde(other)]
    #[serde(skip_serializing)]
    Unbekannt,
}

impl ControlFrame {
    pub fn speaker(username: impl Into<String>) -> Self {
        Self::Speaker {
            username: username.into(),
        }
    }

    pub fn participants(participants: Vec<String>) -> Self {
        Self::Participants { participants }
    }

    /// Serialisiert den Frame als JSON-Text
    pub fn kodieren(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parst einen JSON-Text; unbekannte Typen ergeben `Unbekannt`
    pub fn dekodieren(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
