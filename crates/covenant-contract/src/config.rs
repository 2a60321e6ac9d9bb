//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::ContractError;

/// Gas price, chain and polling settings shared by every invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Chain ID for EIP-155 signing; asked from the node when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Gas price in wei
    #[serde(default = "default_gas_price")]
    pub gas_price: u64,
    /// Gas limit for transactions and deployments
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Delay between receipt polls, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Total time to wait for a receipt, in milliseconds
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
}

fn default_gas_price() -> u64 {
    22_000_000_000
}

fn default_gas_limit() -> u64 {
    4_300_000
}

fn default_poll_interval_ms() -> u64 {
    15_000
}

fn default_receipt_timeout_ms() -> u64 {
    600_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain_id: None,
            gas_price: default_gas_price(),
            gas_limit: default_gas_limit(),
            poll_interval_ms: default_poll_interval_ms(),
            receipt_timeout_ms: default_receipt_timeout_ms(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ContractError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ContractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContractError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Reject settings that would make polling spin or never wait
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.poll_interval_ms == 0 {
            return Err(ContractError::Config("poll_interval_ms must be positive".into()));
        }
        if self.gas_limit == 0 {
            return Err(ContractError::Config("gas_limit must be positive".into()));
        }
        Ok(())
    }

    /// Set the chain ID
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the delay between receipt polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis().max(1) as u64;
        self
    }

    /// Set the receipt deadline
    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout_ms = timeout.as_millis().min(u128::from(u64::MAX)) as u64;
        self
    }

    /// Delay between receipt polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Total receipt deadline
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.chain_id, None);
        assert_eq!(config.gas_limit, 4_300_000);
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.receipt_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_config_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            chain_id = 1337
            poll_interval_ms = 250
        "#,
        )
        .unwrap();
        assert_eq!(config.chain_id, Some(1337));
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.gas_price, 22_000_000_000);
    }

    #[test]
    fn test_config_rejects_zero_interval() {
        assert!(matches!(
            EngineConfig::from_toml_str("poll_interval_ms = 0"),
            Err(ContractError::Config(_))
        ));
        assert!(EngineConfig::from_toml_str("gas_limit = \"lots\"").is_err());
    }

    #[test]
    fn test_config_sub_second_timeout() {
        let config = EngineConfig::default().with_receipt_timeout(Duration::from_millis(900));
        assert_eq!(config.receipt_timeout(), Duration::from_millis(900));

        let config = EngineConfig::from_toml_str("receipt_timeout_ms = 250").unwrap();
        assert_eq!(config.receipt_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let config = EngineConfig::default().with_chain_id(5);
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("chain_id = 5"));
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_config_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "gas_limit = 100000\n").unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap().gas_limit, 100_000);
        assert!(EngineConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
