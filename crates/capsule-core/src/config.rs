//! Configuration types for Time Capsule

use serde::{Deserialize, Serialize};

use crate::constants::{STORE_MEMO, TESTNET_CHAIN_ID, TESTNET_LCD_URL, TESTNET_RPC_URL};
use crate::{Address, CapsuleError, ChainId, Network};

/// Environment variable holding the deployed contract address
pub const ENV_CONTRACT_ADDRESS: &str = "TIME_CAPSULE_CONTRACT_ADDRESS";
pub const ENV_CHAIN_ID: &str = "TIME_CAPSULE_CHAIN_ID";
pub const ENV_RPC_URL: &str = "TIME_CAPSULE_RPC_URL";
pub const ENV_LCD_URL: &str = "TIME_CAPSULE_LCD_URL";

/// Chain connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain id passed to the wallet (e.g., "nibiru-testnet-2")
    pub chain_id: ChainId,

    /// Tendermint RPC endpoint used by signing clients
    pub rpc_url: String,

    /// REST (LCD) endpoint used for contract queries
    pub lcd_url: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: ChainId::new(TESTNET_CHAIN_ID),
            rpc_url: TESTNET_RPC_URL.to_string(),
            lcd_url: TESTNET_LCD_URL.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chain connection settings
    pub chain: ChainConfig,

    /// Network (mainnet or testnet)
    pub network: Network,

    /// Deployed time capsule contract
    pub contract_address: Address,

    /// Memo attached to store transactions
    #[serde(default = "default_memo")]
    pub memo: String,

    /// Timeout applied by the LCD gateway to each request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_memo() -> String {
    STORE_MEMO.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            network: Network::Testnet,
            contract_address: Address::new(""),
            memo: default_memo(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, CapsuleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup, falling back to testnet defaults.
    /// The contract address has no default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CapsuleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(chain_id) = lookup(ENV_CHAIN_ID) {
            config.chain.chain_id = ChainId::new(chain_id);
        }
        if let Some(rpc_url) = lookup(ENV_RPC_URL) {
            config.chain.rpc_url = rpc_url;
        }
        if let Some(lcd_url) = lookup(ENV_LCD_URL) {
            config.chain.lcd_url = lcd_url;
        }

        let contract = lookup(ENV_CONTRACT_ADDRESS).unwrap_or_default();
        config.contract_address = Address::new(contract.trim());

        config.validate()?;
        Ok(config)
    }

    /// Check that required settings are present
    pub fn validate(&self) -> Result<(), CapsuleError> {
        if self.contract_address.as_str().is_empty() {
            return Err(CapsuleError::Config(format!(
                "{} is not set",
                ENV_CONTRACT_ADDRESS
            )));
        }
        if self.chain.chain_id.as_str().is_empty() {
            return Err(CapsuleError::Config("chain id is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chain.chain_id.as_str(), "nibiru-testnet-2");
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.memo, "Store time capsule message");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CONTRACT_ADDRESS, " nibi1contract "),
            (ENV_LCD_URL, "http://localhost:1317"),
        ]);
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.contract_address.as_str(), "nibi1contract");
        assert_eq!(config.chain.lcd_url, "http://localhost:1317");
        assert_eq!(config.chain.rpc_url, TESTNET_RPC_URL);
    }

    #[test]
    fn test_missing_contract_address() {
        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err.error_code(), "config_error");
        assert!(err.to_string().contains(ENV_CONTRACT_ADDRESS));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            contract_address: Address::new("nibi1contract"),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.contract_address, config.contract_address);
        assert_eq!(parsed.chain.lcd_url, config.chain.lcd_url);
    }
}
