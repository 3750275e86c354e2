//! Passwort-Hashing mit Argon2id
//!
//! Hashes werden als PHC-String gespeichert (Algorithmus, Parameter und Salt
//! stehen im String), daher koennen die Parameter spaeter angehoben werden,
//! ohne dass bestehende Hashes ungueltig werden.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::AuthError;

/// Argon2id-Hasher mit festen Kostenparametern
#[derive(Clone)]
pub struct PasswortHasher {
    argon2: Argon2<'static>,
}

impl PasswortHasher {
    /// OWASP-Empfehlung: 19 MiB, 2 Iterationen, 1 Thread
    pub fn standard() -> Self {
        Self::mit_parametern(19 * 1024, 2, 1)
    }

    /// Hasher mit expliziten Kosten (`speicher_kib`, `iterationen`, `parallelitaet`)
    ///
    /// Ungueltige Kombinationen fallen auf die Argon2-Standardparameter zurueck.
    pub fn mit_parametern(speicher_kib: u32, iterationen: u32, parallelitaet: u32) -> Self {
        let params = Params::new(speicher_kib, iterationen, parallelitaet, None).unwrap_or_else(|e| {
            tracing::warn!(fehler = %e, "Argon2-Parameter ungueltig, verwende Standard");
            Params::default()
        });
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hasht ein Passwort mit zufaelligem Salt
    pub fn hashen(&self, passwort: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(passwort.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    /// Prueft ein Passwort gegen einen gespeicherten PHC-Hash
    ///
    /// Falsches Passwort ist `Ok(false)`, ein kaputter Hash ist ein Fehler.
    pub fn verifizieren(&self, passwort: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

        match self.argon2.verify_password(passwort.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
        }
    }
}

impl Default for PasswortHasher {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Kleine Kosten, damit die Tests schnell bleiben
    fn hasher() -> PasswortHasher {
        PasswortHasher::mit_parametern(1024, 1, 1)
    }

    #[test]
    fn hashen_und_verifizieren() {
        let h = hasher();
        let hash = h.hashen("geheim123").expect("Hashing fehlgeschlagen");

        assert!(hash.starts_with("$argon2id$"));
        assert!(h.verifizieren("geheim123", &hash).unwrap());
        assert!(!h.verifizieren("falsch", &hash).unwrap());
    }

    #[test]
    fn salt_macht_hashes_verschieden() {
        let h = hasher();
        let a = h.hashen("gleich").unwrap();
        let b = h.hashen("gleich").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn kaputter_hash_ist_fehler() {
        assert!(hasher().verifizieren("x", "kein_phc_string").is_err());
    }

    #[test]
    fn hash_mit_anderen_parametern_bleibt_pruefbar() {
        let alt = PasswortHasher::mit_parametern(2048, 1, 1);
        let hash = alt.hashen("pw").unwrap();
        assert!(hasher().verifizieren("pw", &hash).unwrap());
    }

    #[test]
    fn ungueltige_parameter_fallen_zurueck() {
        // 0 Iterationen ist fuer Argon2 ungueltig
        let h = PasswortHasher::mit_parametern(1024, 0, 1);
        let hash = h.hashen("pw").unwrap();
        assert!(h.verifizieren("pw", &hash).unwrap());
    }
}
