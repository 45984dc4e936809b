use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level client configuration (loaded from pixvault.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PixvaultConfig {
    pub client: ClientConfig,
    pub crypto: CryptoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend API base URL
    pub api_endpoint: String,
    /// Maximum accepted photo size in MiB before encryption
    pub max_photo_mb: u64,
    /// Log level (default: info)
    pub log_level: String,
    /// Log format: "json" or "text"
    pub log_format: String,
}

/// Key-derivation cost parameters.
///
/// These must stay identical between the values used to seal an envelope and
/// those used to open it; envelopes record the costs they were sealed with so
/// a drift is detected at open time rather than surfacing as a bogus
/// wrong-password failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB)
    pub argon2_mem_cost_kib: u32,
    /// Argon2id time cost (iterations, default: 3)
    pub argon2_time_cost: u32,
    /// Argon2id parallelism (default: 4)
    pub argon2_parallelism: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8080".into(),
            max_photo_mb: 64,
            log_level: "info".into(),
            log_format: "text".into(),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            argon2_mem_cost_kib: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
        }
    }
}

impl PixvaultConfig {
    /// Load configuration from a TOML file. Missing sections fall back to
    /// defaults.
    pub fn load(path: &Path) -> crate::PixvaultResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)
            .map_err(|e| crate::PixvaultError::Config(format!("parsing {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[client]
api_endpoint = "https://photos.example.com"
max_photo_mb = 128
log_level = "debug"
log_format = "json"

[crypto]
argon2_mem_cost_kib = 131072
argon2_time_cost = 4
argon2_parallelism = 8
"#;
        let config: PixvaultConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.client.api_endpoint, "https://photos.example.com");
        assert_eq!(config.client.max_photo_mb, 128);
        assert_eq!(config.client.log_level, "debug");
        assert_eq!(config.crypto.argon2_mem_cost_kib, 131072);
        assert_eq!(config.crypto.argon2_time_cost, 4);
        assert_eq!(config.crypto.argon2_parallelism, 8);
    }

    #[test]
    fn test_parse_defaults() {
        let config: PixvaultConfig = toml::from_str("").unwrap();

        assert_eq!(config.client.api_endpoint, "http://localhost:8080");
        assert_eq!(config.client.log_level, "info");
        assert_eq!(config.crypto.argon2_mem_cost_kib, 65536);
        assert_eq!(config.crypto.argon2_time_cost, 3);
        assert_eq!(config.crypto.argon2_parallelism, 4);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[crypto]
argon2_time_cost = 5
"#;
        let config: PixvaultConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.crypto.argon2_time_cost, 5);
        // Defaults
        assert_eq!(config.crypto.argon2_mem_cost_kib, 65536);
        assert_eq!(config.client.log_level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nlog_level = \"trace\"").unwrap();

        let config = PixvaultConfig::load(file.path()).unwrap();
        assert_eq!(config.client.log_level, "trace");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = PixvaultConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PixvaultConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.client.api_endpoint, parsed.client.api_endpoint);
        assert_eq!(config.crypto, parsed.crypto);
    }
}
