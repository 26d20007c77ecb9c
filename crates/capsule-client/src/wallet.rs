//! Wallet capability
//!
//! A browser-style wallet extension: approve a chain, hand out an offline
//! signer, expose account addresses. Different wallet backends are the same
//! trait; what differs is reported through [`Compatibility`] so callers can
//! warn instead of branching on wallet identity.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use capsule_core::{Address, ChainId, WalletError};
use serde::{Deserialize, Serialize};

/// Known wallet backends
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    Leap,
    Keplr,
    Other(String),
}

impl WalletKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Leap => "Leap",
            Self::Keplr => "Keplr",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How well a backend supports the configured chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "PascalCase")]
pub enum Compatibility {
    /// Signing and queries fully supported
    Full,
    /// Usable, with limitations the UI should surface
    Partial { reason: String },
}

impl Compatibility {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Snapshot of the injected wallet for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub kind: WalletKind,
    pub compatibility: Compatibility,
}

/// An account exposed by an offline signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
}

/// Signer handed out by a wallet for one chain
#[async_trait]
pub trait OfflineSigner: Send + Sync {
    async fn accounts(&self) -> Result<Vec<Account>, WalletError>;
}

/// Wallet extension capability
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn kind(&self) -> WalletKind;

    fn compatibility(&self, _chain_id: &ChainId) -> Compatibility {
        Compatibility::Full
    }

    /// Ask the user to approve access to `chain_id`
    async fn enable(&self, chain_id: &ChainId) -> Result<(), WalletError>;

    async fn offline_signer(&self, chain_id: &ChainId)
        -> Result<Arc<dyn OfflineSigner>, WalletError>;
}
