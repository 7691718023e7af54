use std::{fmt, sync::Arc};

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Senha do painel admin, guardada só como hash argon2 (formato PHC).
#[derive(Clone)]
pub struct AdminPassword {
    hash: Arc<str>,
}

impl AdminPassword {
    /// Aceita um hash PHC pronto, como em `ADMIN_PASSWORD_HASH`.
    pub fn from_hash(hash: &str) -> Option<Self> {
        PasswordHash::new(hash).ok()?;
        Some(Self { hash: hash.into() })
    }

    /// Gera o hash de uma senha em texto, com salt novo.
    pub fn from_plain(password: &str) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(Self { hash: hash.to_string().into() })
    }

    /// Custa alguns milissegundos de CPU; chamar fora do runtime async.
    pub fn matches(&self, candidate: &str) -> bool {
        PasswordHash::new(&self.hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

// O hash não vai para o log junto com a Config
impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminPassword(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_original_password() {
        let password = AdminPassword::from_plain("q1w2e3r4t5").unwrap();
        assert!(password.matches("q1w2e3r4t5"));
        assert!(!password.matches("q1w2e3r4t6"));
        assert!(!password.matches(""));
    }

    #[test]
    fn accepts_only_phc_hashes() {
        let hashed = AdminPassword::from_plain("q1w2e3r4t5").unwrap();
        let reloaded = AdminPassword::from_hash(&hashed.hash).unwrap();
        assert!(reloaded.matches("q1w2e3r4t5"));

        assert!(AdminPassword::from_hash("q1w2e3r4t5").is_none());
        assert!(AdminPassword::from_hash("").is_none());
    }

    #[test]
    fn debug_hides_the_hash() {
        let password = AdminPassword::from_plain("q1w2e3r4t5").unwrap();
        assert_eq!(format!("{password:?}"), "AdminPassword(***)");
    }
}
