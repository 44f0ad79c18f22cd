//! Server configuration, loaded from a TOML context file.
//!
//! The context name resolves to `/etc/konveksi/<name>.toml`; a value
//! containing `/` or `.` is treated as a literal path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub owner: OwnerConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
}

/// Owner account credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerConfig {
    /// argon2id hash of the owner password.
    pub password_hash: String,
}

/// Storage locations.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
}

/// JWT signing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

fn default_expire_secs() -> u64 {
    86400
}

impl ServerConfig {
    /// Resolve a context name or literal path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/konveksi/{}.toml", name_or_path))
        }
    }

    /// Load and parse the config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("cannot parse config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Path of the SQLite database inside the data dir.
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("konveksi.sqlite")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_name_vs_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/konveksi/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        std::fs::write(
            &path,
            r#"
[owner]
password_hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"

[storage]
data_dir = "/var/lib/konveksi"

[jwt]
secret = "s3cret"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/konveksi");
        assert_eq!(config.jwt.expire_secs, 86400);
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("/var/lib/konveksi/konveksi.sqlite")
        );
    }
}
