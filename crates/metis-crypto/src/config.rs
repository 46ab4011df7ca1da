use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};

/// Smallest accepted nonce length in bytes.
pub const MIN_NONCE_LEN: usize = 12;
/// Largest accepted nonce length in bytes.
pub const MAX_NONCE_LEN: usize = 64;

/// Configuration for [`Blake3KeySet`](crate::Blake3KeySet).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySetConfig {
    /// Key-derivation context. Key-sets built from the same secret under
    /// different contexts are unrelated.
    pub context: String,
    /// Random nonce length prepended to every ciphertext.
    pub nonce_len: usize,
}

impl Default for KeySetConfig {
    fn default() -> Self {
        Self {
            context: "metis-fields 2024 field encryption".to_string(),
            nonce_len: 16,
        }
    }
}

impl KeySetConfig {
    /// Parse from TOML and validate. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| CryptoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.context.trim().is_empty() {
            return Err(CryptoError::InvalidConfig("empty derivation context".into()));
        }
        if !(MIN_NONCE_LEN..=MAX_NONCE_LEN).contains(&self.nonce_len) {
            return Err(CryptoError::InvalidConfig(format!(
                "nonce_len {} outside {MIN_NONCE_LEN}..={MAX_NONCE_LEN}",
                self.nonce_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = KeySetConfig::default();
        assert_eq!(c.nonce_len, 16);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_overrides_and_defaults() {
        let c = KeySetConfig::from_toml_str("nonce_len = 24\n").unwrap();
        assert_eq!(c.nonce_len, 24);
        assert_eq!(c.context, KeySetConfig::default().context);
    }

    #[test]
    fn nonce_len_out_of_range() {
        assert!(KeySetConfig::from_toml_str("nonce_len = 4\n").is_err());
        assert!(KeySetConfig::from_toml_str("nonce_len = 65\n").is_err());
    }

    #[test]
    fn empty_context_rejected() {
        let c = KeySetConfig {
            context: "  ".into(),
            ..KeySetConfig::default()
        };
        assert!(matches!(c.validate(), Err(CryptoError::InvalidConfig(_))));
    }
}
