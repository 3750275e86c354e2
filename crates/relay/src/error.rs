//! Fehlertypen fuer den Relay-Kern

use holler_core::HollerError;
use thiserror::Error;

/// Fehlertyp fuer Relay, Sessions und Transporte
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Transportfehler ausserhalb von std::io (z.B. WebSocket)
    #[error("Transportfehler: {0}")]
    Transport(String),

    /// Empfaenger hat die Queue nicht rechtzeitig geleert
    #[error("Sende-Timeout nach {0} ms")]
    SendeTimeout(u64),

    /// Verbindung ist bereits geschlossen
    #[error("Verbindung geschlossen")]
    VerbindungGeschlossen,

    /// Steuer-Frame liess sich nicht kodieren
    #[error("Steuer-Frame ungueltig: {0}")]
    Steuerframe(#[from] serde_json::Error),

    /// Fehler eines Collaborators (AuthStore, AudioLog)
    #[error(transparent)]
    Holler(#[from] HollerError),
}

impl RelayError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Result-Typ fuer den Relay-Kern
pub type RelayResult<T> = Result<T, RelayError>;
