//! holler-relay – Registry, Fan-out und Verbindungs-Sessions
//!
//! Der Relay-Kern verwaltet alle aktiven Clients und verteilt Audio-Segmente
//! eines Sprechers an alle anderen Teilnehmer.
//!
//! ## Architektur
//! ```text
//! Transport (WebSocket / TCP)
//!     |
//!     v
//! ConnectionSession  --aufloesen-->  AuthStore
//!     |  hinzufuegen/entfernen
//!     v
//! ClientRegistry  <--snapshot--  MembershipNotifier (Roster an alle)
//!     ^
//!     |  snapshot
//! BroadcastEngine  --anhaengen-->  AudioLog
//!     |
//!     v
//! ClientHandle-Queues  -->  Writer-Task je Verbindung  -->  Transport
//! ```
//!
//! Jede Verbindung laeuft in einem eigenen tokio-Task. Geteilt wird nur der
//! `HubKontext`; die Registry ist die einzige veraenderliche Struktur.

pub mod broadcast;
pub mod error;
pub mod handle;
pub mod hub;
pub mod membership;
pub mod registry;
pub mod session;
pub mod tcp;
pub mod transport;

#[cfg(test)]
pub(crate) mod testhilfe;

pub use broadcast::{BroadcastEngine, FanoutBericht};
pub use error::{RelayError, RelayResult};
pub use handle::{ClientHandle, Sendung};
pub use hub::{HubKontext, RelayKonfig};
pub use membership::MembershipNotifier;
pub use registry::ClientRegistry;
pub use session::{AblehnungsGrund, ConnectionSession, SitzungsErgebnis, SitzungsZustand, TrennungsGrund};
pub use tcp::{aufteilen, TcpQuelle, TcpRelayServer, TcpSenke};
pub use transport::{speicher_verbindung, FrameQuelle, FrameSenke, Gegenstelle, KanalQuelle, KanalSenke};
