use anyhow::ensure;
use serde::Deserialize;

/// Application settings, extracted by figment from `appsettings.json`
/// overlaid with `APP_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Signs the session cookie. Must be at least 64 bytes.
    pub secret_key: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_templates_glob")]
    pub templates_glob: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    // argon2 cost knobs
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.secret_key.len() >= 64,
            "secret_key must be at least 64 bytes, got {}",
            self.secret_key.len()
        );
        ensure!(!self.database_url.is_empty(), "database_url must be set");
        Ok(())
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_templates_glob() -> String {
    "src/templates/**/*".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_hash_memory_kib() -> u32 {
    65536
}

fn default_hash_iterations() -> u32 {
    3
}

fn default_hash_parallelism() -> u32 {
    4
}

#[cfg(test)]
mod tests {
    use figment::{providers::Format, Figment};

    use super::*;

    #[test]
    fn fills_defaults_from_minimal_json() {
        let cfg: AppConfig = Figment::new()
            .merge(figment::providers::Json::string(
                r#"{
                    "database_url": "postgres://localhost/blog",
                    "secret_key": "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
                }"#,
            ))
            .extract()
            .unwrap();

        assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
        assert_eq!(cfg.templates_glob, "src/templates/**/*");
        assert_eq!(cfg.static_dir, "static");
        assert_eq!(cfg.hash_memory_kib, 65536);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_short_secret_key() {
        let cfg: AppConfig = Figment::new()
            .merge(figment::providers::Json::string(
                r#"{"database_url": "postgres://localhost/blog", "secret_key": "short"}"#,
            ))
            .extract()
            .unwrap();

        assert!(cfg.validate().is_err());
    }
}
