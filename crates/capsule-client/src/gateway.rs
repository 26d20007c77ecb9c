//! Chain gateway capability
//!
//! Two halves: a factory that binds a signing client to an RPC endpoint and
//! an offline signer, and a read-only querier for contract smart queries.
//! Transport and signing scheme live behind these traits.

use std::sync::Arc;

use async_trait::async_trait;
use capsule_core::{Address, ChainError, Coin, FeeMode, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::wallet::OfflineSigner;

/// Outcome of a contract execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResult {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub gas_used: Option<u64>,
}

/// Client able to sign and broadcast contract executions
#[async_trait]
pub trait SigningClient: Send + Sync {
    async fn execute(
        &self,
        sender: &Address,
        contract: &Address,
        msg: &Value,
        fee: &FeeMode,
        memo: &str,
        funds: &[Coin],
    ) -> Result<ExecuteResult, ChainError>;
}

/// Binds signing clients to an endpoint
#[async_trait]
pub trait SigningClientFactory: Send + Sync {
    async fn connect_with_signer(
        &self,
        rpc_url: &str,
        signer: Arc<dyn OfflineSigner>,
    ) -> Result<Box<dyn SigningClient>, ChainError>;
}

/// Read-only contract queries.
///
/// Implementations report "no record for this key" as
/// [`ChainError::NotFound`] so it can be told apart from transport errors.
#[async_trait]
pub trait ContractQuerier: Send + Sync {
    async fn query_contract_smart(&self, contract: &Address, msg: &Value)
        -> Result<Value, ChainError>;
}

/// Both halves of the chain gateway
#[derive(Clone)]
pub struct ChainGateway {
    pub signing: Arc<dyn SigningClientFactory>,
    pub querier: Arc<dyn ContractQuerier>,
}

impl ChainGateway {
    pub fn new(signing: Arc<dyn SigningClientFactory>, querier: Arc<dyn ContractQuerier>) -> Self {
        Self { signing, querier }
    }
}
