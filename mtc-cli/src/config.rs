//! Issuer configuration, loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_window_size() -> u16 {
    14
}

/// An issuer's on-disk policy: where its batches and keys live, and how
/// many tree heads to keep in its signed validity window.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuerConfig {
    /// Hex-encoded issuer id, at most 32 bytes when decoded.
    pub issuer_id: String,
    /// Number of recent tree heads to retain in the signed window.
    #[serde(default = "default_window_size")]
    pub window_size: u16,
    /// Root of the publication layout (`<root>/batches/<b>/...`).
    pub batches_root: PathBuf,
    /// Path to the issuer's PEM-framed Ed25519 private key.
    pub private_key_path: PathBuf,
    /// Path to the issuer's PEM-framed Ed25519 public key.
    pub public_key_path: PathBuf,
    /// Disable per-object validation during issuance for throughput.
    #[serde(default)]
    pub no_validation: bool,
}

impl IssuerConfig {
    /// Load and parse an issuer config from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    /// Decode [`IssuerConfig::issuer_id`] to raw bytes.
    pub fn issuer_id_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(hex::decode(self.issuer_id.trim_start_matches("0x"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let toml = r#"
            issuer_id = "746573742e6973737565722e31"
            batches_root = "/tmp/mtc/batches"
            private_key_path = "/tmp/mtc/issuer.key"
            public_key_path = "/tmp/mtc/issuer.pub"
        "#;
        let config: IssuerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.window_size, 14);
        assert!(!config.no_validation);
        assert_eq!(config.issuer_id_bytes().unwrap(), b"test.issuer.1".to_vec());
    }

    #[test]
    fn parses_explicit_overrides() {
        let toml = r#"
            issuer_id = "ab"
            window_size = 7
            batches_root = "/data/batches"
            private_key_path = "/data/issuer.key"
            public_key_path = "/data/issuer.pub"
            no_validation = true
        "#;
        let config: IssuerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.window_size, 7);
        assert!(config.no_validation);
    }
}
