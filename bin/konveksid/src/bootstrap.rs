//! Bootstrap — first-start checks and owner account creation.
//!
//! When konveksid starts:
//! 1. Verify the config has an owner password hash — if not, refuse to start.
//! 2. Ensure the owner user row exists in the database.

use konveksi_core::Role;
use tracing::info;

use crate::config::ServerConfig;
use crate::users::UserStore;

/// The well-known username of the owner account.
pub const OWNER_USERNAME: &str = "owner";

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.owner.password_hash.is_empty() {
        anyhow::bail!(
            "No owner password hash found in configuration.\n\
             Generate one with an argon2id tool and set [owner].password_hash first."
        );
    }
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Ensure the owner user exists. Creates it from the config hash if missing.
pub fn ensure_owner_user(users: &UserStore, config: &ServerConfig) -> anyhow::Result<()> {
    match users.get_credentials(OWNER_USERNAME) {
        Ok(Some(_)) => {
            info!("owner user already exists");
            Ok(())
        }
        Ok(None) => {
            users
                .create(OWNER_USERNAME, "Owner", Role::Owner, &config.owner.password_hash)
                .map_err(|e| anyhow::anyhow!("failed to create owner user: {}", e))?;
            info!("Created owner user");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("failed to check owner user: {}", e)),
    }
}

/// Verify a login attempt against the stored argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::PasswordHash;
    use password_hash::PasswordVerifier;

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

/// Hash a new user's password with argon2id.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, OwnerConfig, StorageConfig};

    fn config(hash: &str) -> ServerConfig {
        ServerConfig {
            owner: OwnerConfig {
                password_hash: hash.to_string(),
            },
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            jwt: JwtConfig {
                secret: "test".to_string(),
                expire_secs: 3600,
            },
        }
    }

    #[test]
    fn test_verify_config_empty_hash() {
        assert!(verify_config(&config("")).is_err());
        assert!(verify_config(&config("$argon2id$...")).is_ok());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(!verify_password("test", "not-a-hash"));
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("rahasia-123").unwrap();
        assert!(verify_password("rahasia-123", &hash));
        assert!(!verify_password("salah", &hash));
    }
}
