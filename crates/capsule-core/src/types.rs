//! Core type definitions for Time Capsule

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix epoch seconds (UTC)
pub type UnixSeconds = i64;

/// Chain account or contract address (bech32, e.g. "nibi1...")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable prefix (the part before the last '1')
    pub fn prefix(&self) -> Option<&str> {
        self.0.rfind('1').map(|idx| &self.0[..idx])
    }

    /// Shortened form for notifications: first 8 and last 4 characters
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return self.0.clone();
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction hash as reported by the chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chain identifier (e.g., "nibiru-testnet-2")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Native coin amount attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    /// Amount as a string (to handle large numbers)
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

/// Fee selection for contract execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeeMode {
    /// Let the signing client simulate and pick gas/fee
    #[default]
    Auto,
    /// Explicit fee
    Fixed { amount: Vec<Coin>, gas: u64 },
}

/// Constants
pub mod constants {
    /// Memo attached to capsule creation transactions
    pub const STORE_MEMO: &str = "Store time capsule message";

    /// Nibiru testnet-2 chain id
    pub const TESTNET_CHAIN_ID: &str = "nibiru-testnet-2";

    /// Nibiru testnet-2 Tendermint RPC endpoint
    pub const TESTNET_RPC_URL: &str = "https://rpc.testnet-2.nibiru.fi";

    /// Nibiru testnet-2 REST (LCD) endpoint
    pub const TESTNET_LCD_URL: &str = "https://lcd.testnet-2.nibiru.fi";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_short() {
        let addr = Address::new("nibi1qyqszqgpqyqszqgpqyqszqgpqyqszqgpd5wd8w");
        assert_eq!(addr.short(), "nibi1qyq...wd8w");

        let tiny = Address::new("nibi1abc");
        assert_eq!(tiny.short(), "nibi1abc");
    }

    #[test]
    fn test_address_prefix() {
        assert_eq!(Address::new("nibi1xyz").prefix(), Some("nibi"));
        assert_eq!(Address::new("noseparator").prefix(), None);
    }

    #[test]
    fn test_fee_mode_serialization() {
        assert_eq!(serde_json::to_string(&FeeMode::Auto).unwrap(), "\"auto\"");
        let fixed = FeeMode::Fixed {
            amount: vec![Coin::new("5000", "unibi")],
            gas: 200_000,
        };
        let json = serde_json::to_value(&fixed).unwrap();
        assert_eq!(json["fixed"]["gas"], 200_000);
        assert_eq!(json["fixed"]["amount"][0]["denom"], "unibi");
    }

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Mainnet.as_str(), "mainnet");
        assert_eq!(Network::Testnet.to_string(), "testnet");
    }
}
