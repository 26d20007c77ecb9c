//! In-memory wallet and chain doubles
//!
//! [`MockChain`] behaves like the deployed contract: `store_message` saves a
//! capsule under the sender, `get_message` reveals it once the mock block time
//! reaches the unlock time. Injected chain failures are one-shot; wallet
//! failures stay until [`MockWallet::clear_failures`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use capsule_core::{
    Address, ChainError, ChainId, Coin, FeeMode, TxHash, UnixSeconds, WalletError,
};
use serde_json::Value;
use time_capsule::{ExecuteMsg, MessageResponse, QueryMsg, LOCKED_PLACEHOLDER};

use crate::gateway::{
    ChainGateway, ContractQuerier, ExecuteResult, SigningClient, SigningClientFactory,
};
use crate::wallet::{Account, Compatibility, OfflineSigner, WalletKind, WalletSigner};

// ─── Wallet ──────────────────────────────────────────────────────────────────

pub struct MockWallet {
    kind: WalletKind,
    compatibility: Compatibility,
    accounts: Mutex<Vec<Address>>,
    enable_error: Mutex<Option<WalletError>>,
    signer_error: Mutex<Option<WalletError>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockWallet {
    pub fn leap(accounts: Vec<Address>) -> Self {
        Self::with_kind(WalletKind::Leap, Compatibility::Full, accounts)
    }

    pub fn partial(kind: WalletKind, reason: &str, accounts: Vec<Address>) -> Self {
        Self::with_kind(
            kind,
            Compatibility::Partial {
                reason: reason.to_string(),
            },
            accounts,
        )
    }

    fn with_kind(kind: WalletKind, compatibility: Compatibility, accounts: Vec<Address>) -> Self {
        Self {
            kind,
            compatibility,
            accounts: Mutex::new(accounts),
            enable_error: Mutex::new(None),
            signer_error: Mutex::new(None),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fail_enable(&self, err: WalletError) {
        *lock(&self.enable_error) = Some(err);
    }

    pub fn fail_signer(&self, err: WalletError) {
        *lock(&self.signer_error) = Some(err);
    }

    /// Switch the wallet's exposed accounts, as when the user changes account
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *lock(&self.accounts) = accounts;
    }

    pub fn clear_failures(&self) {
        *lock(&self.enable_error) = None;
        *lock(&self.signer_error) = None;
    }

    /// Wallet calls made so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: &'static str) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn kind(&self) -> WalletKind {
        self.kind.clone()
    }

    fn compatibility(&self, _chain_id: &ChainId) -> Compatibility {
        self.compatibility.clone()
    }

    async fn enable(&self, _chain_id: &ChainId) -> Result<(), WalletError> {
        self.record("enable");
        match lock(&self.enable_error).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn offline_signer(
        &self,
        _chain_id: &ChainId,
    ) -> Result<Arc<dyn OfflineSigner>, WalletError> {
        self.record("offline_signer");
        if let Some(err) = lock(&self.signer_error).clone() {
            return Err(err);
        }
        Ok(Arc::new(MockSigner {
            accounts: lock(&self.accounts).clone(),
            calls: self.calls.clone(),
        }))
    }
}

struct MockSigner {
    accounts: Vec<Address>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl OfflineSigner for MockSigner {
    async fn accounts(&self) -> Result<Vec<Account>, WalletError> {
        lock(&self.calls).push("accounts");
        Ok(self
            .accounts
            .iter()
            .map(|address| Account {
                address: address.clone(),
            })
            .collect())
    }
}

// ─── Chain ───────────────────────────────────────────────────────────────────

/// A successful `execute` as seen by the mock chain
#[derive(Debug, Clone)]
pub struct ExecutedCall {
    pub rpc_url: String,
    pub sender: Address,
    pub contract: Address,
    pub msg: Value,
    pub fee: FeeMode,
    pub memo: String,
    pub funds: Vec<Coin>,
}

#[derive(Clone)]
pub struct MockChain {
    inner: Arc<ChainInner>,
}

struct StoredCapsule {
    message: String,
    unlock_time: u64,
}

struct ChainInner {
    block_time: AtomicI64,
    capsules: Mutex<HashMap<String, StoredCapsule>>,
    executed: Mutex<Vec<ExecutedCall>>,
    queries: AtomicUsize,
    next_tx: AtomicU64,
    connect_error: Mutex<Option<ChainError>>,
    execute_error: Mutex<Option<ChainError>>,
    query_error: Mutex<Option<ChainError>>,
    raw_response: Mutex<Option<Value>>,
}

impl MockChain {
    pub fn new(block_time: UnixSeconds) -> Self {
        Self {
            inner: Arc::new(ChainInner {
                block_time: AtomicI64::new(block_time),
                capsules: Mutex::new(HashMap::new()),
                executed: Mutex::new(Vec::new()),
                queries: AtomicUsize::new(0),
                next_tx: AtomicU64::new(1),
                connect_error: Mutex::new(None),
                execute_error: Mutex::new(None),
                query_error: Mutex::new(None),
                raw_response: Mutex::new(None),
            }),
        }
    }

    /// Gateway backed by this chain
    pub fn gateway(&self) -> ChainGateway {
        ChainGateway::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    pub fn set_block_time(&self, block_time: UnixSeconds) {
        self.inner.block_time.store(block_time, Ordering::SeqCst);
    }

    /// Seed a capsule directly, bypassing `execute`
    pub fn store(&self, owner: &str, message: &str, unlock_time: u64) {
        lock(&self.inner.capsules).insert(
            owner.to_string(),
            StoredCapsule {
                message: message.to_string(),
                unlock_time,
            },
        );
    }

    pub fn executed(&self) -> Vec<ExecutedCall> {
        lock(&self.inner.executed).clone()
    }

    pub fn query_count(&self) -> usize {
        self.inner.queries.load(Ordering::SeqCst)
    }

    pub fn fail_connect(&self, err: ChainError) {
        *lock(&self.inner.connect_error) = Some(err);
    }

    pub fn fail_execute(&self, err: ChainError) {
        *lock(&self.inner.execute_error) = Some(err);
    }

    pub fn fail_query(&self, err: ChainError) {
        *lock(&self.inner.query_error) = Some(err);
    }

    /// Answer the next query with `value` instead of contract state
    pub fn respond_raw(&self, value: Option<Value>) {
        *lock(&self.inner.raw_response) = value;
    }
}

#[async_trait]
impl SigningClientFactory for MockChain {
    async fn connect_with_signer(
        &self,
        rpc_url: &str,
        signer: Arc<dyn OfflineSigner>,
    ) -> Result<Box<dyn SigningClient>, ChainError> {
        if let Some(err) = lock(&self.inner.connect_error).take() {
            return Err(err);
        }
        Ok(Box::new(MockSigningClient {
            chain: self.clone(),
            rpc_url: rpc_url.to_string(),
            signer,
        }))
    }
}

struct MockSigningClient {
    chain: MockChain,
    rpc_url: String,
    signer: Arc<dyn OfflineSigner>,
}

#[async_trait]
impl SigningClient for MockSigningClient {
    async fn execute(
        &self,
        sender: &Address,
        contract: &Address,
        msg: &Value,
        fee: &FeeMode,
        memo: &str,
        funds: &[Coin],
    ) -> Result<ExecuteResult, ChainError> {
        let inner = &self.chain.inner;
        if let Some(err) = lock(&inner.execute_error).take() {
            return Err(err);
        }

        let accounts = self
            .signer
            .accounts()
            .await
            .map_err(|e| ChainError::Signing {
                message: e.to_string(),
            })?;
        if !accounts.iter().any(|a| &a.address == sender) {
            return Err(ChainError::Signing {
                message: format!("signer has no key for {}", sender),
            });
        }

        let ExecuteMsg::StoreMessage {
            message,
            unlock_time,
        } = serde_json::from_value(msg.clone()).map_err(|e| ChainError::Rejected {
            message: format!("Error parsing into type ExecuteMsg: {}", e),
        })?;
        self.chain.store(sender.as_str(), &message, unlock_time);

        lock(&inner.executed).push(ExecutedCall {
            rpc_url: self.rpc_url.clone(),
            sender: sender.clone(),
            contract: contract.clone(),
            msg: msg.clone(),
            fee: fee.clone(),
            memo: memo.to_string(),
            funds: funds.to_vec(),
        });

        let n = inner.next_tx.fetch_add(1, Ordering::SeqCst);
        Ok(ExecuteResult {
            transaction_hash: TxHash::new(format!("{:064X}", n)),
            height: Some(n),
            gas_used: Some(120_000),
        })
    }
}

#[async_trait]
impl ContractQuerier for MockChain {
    async fn query_contract_smart(
        &self,
        _contract: &Address,
        msg: &Value,
    ) -> Result<Value, ChainError> {
        let inner = &self.inner;
        inner.queries.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = lock(&inner.query_error).take() {
            return Err(err);
        }
        if let Some(raw) = lock(&inner.raw_response).take() {
            return Ok(raw);
        }

        let QueryMsg::GetMessage { owner } =
            serde_json::from_value(msg.clone()).map_err(|e| ChainError::ApiError {
                message: format!("Error parsing into type QueryMsg: {}", e),
            })?;

        let capsules = lock(&inner.capsules);
        let stored = capsules.get(&owner).ok_or_else(|| ChainError::NotFound {
            message: "type: time_capsule::state::Capsule; key: [..] not found".to_string(),
        })?;

        let block_time = inner.block_time.load(Ordering::SeqCst);
        let is_unlocked = u64::try_from(block_time).map_or(false, |t| t >= stored.unlock_time);
        let response = MessageResponse {
            message: if is_unlocked {
                stored.message.clone()
            } else {
                LOCKED_PLACEHOLDER.to_string()
            },
            owner: Some(owner.clone()),
            unlock_time: stored.unlock_time,
            is_unlocked,
        };

        serde_json::to_value(response).map_err(|e| ChainError::ParseError(e.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
