//! holler-auth – Auth-Service
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Session-Management (in-memory mit TTL)
//! - AuthService (Registrierung, Login, Logout, Session-Pruefung)
//! - `AuthStore` fuer den Relay: Benutzername -> Identitaet

pub mod error;
pub mod password;
pub mod service;
pub mod session;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult};
pub use password::PasswortHasher;
pub use service::AuthService;
pub use session::{Session, SessionStore};
