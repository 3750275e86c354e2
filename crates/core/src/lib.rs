//! holler-core – Gemeinsame Typen, Traits und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Holler-Crates gemeinsam genutzt werden. Die Collaborator-Traits
//! (`AuthStore`, `AudioLog`) liegen hier, damit Relay und Persistenz
//! nicht voneinander abhaengen.

pub mod error;
pub mod traits;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{HollerError, Result};
pub use traits::{AudioLog, AuthStore};
pub use types::{ConnectionId, Identitaet, UserId};
