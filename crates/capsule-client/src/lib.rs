//! capsule-client: the seam between the application and its wallet and chain
//!
//! [`CapsuleClient`] owns the three externally facing operations
//! (`connect`, `create_capsule`, `fetch_capsule`) and maps collaborator
//! failures into [`CapsuleError`]. Nothing is retried here; every retry is a
//! fresh call from the user.

pub mod flow;
pub mod gateway;
pub mod lcd;
pub mod wallet;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::sync::Arc;

use capsule_core::{
    Address, AppConfig, CapsuleError, ChainError, FeeMode, Result, TxHash, UnixSeconds,
    WalletError,
};
use serde::{Deserialize, Serialize};
use time_capsule::{
    build_create_request, build_query_request, validate_address, Capsule, MessageResponse,
};

pub use flow::{FlowEvent, FlowState, InvalidTransition};
pub use gateway::{
    ChainGateway, ContractQuerier, ExecuteResult, SigningClient, SigningClientFactory,
};
pub use lcd::LcdQuerier;
pub use wallet::{Account, Compatibility, OfflineSigner, WalletInfo, WalletKind, WalletSigner};

/// Reference to a submitted capsule creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub owner: Address,
    pub unlock_time: UnixSeconds,
}

/// Time capsule client bound to one contract
#[derive(Clone)]
pub struct CapsuleClient {
    config: AppConfig,
    wallet: Option<Arc<dyn WalletSigner>>,
    gateway: ChainGateway,
}

impl CapsuleClient {
    /// `wallet` is `None` when no wallet extension was found
    pub fn new(
        config: AppConfig,
        wallet: Option<Arc<dyn WalletSigner>>,
        gateway: ChainGateway,
    ) -> Self {
        Self {
            config,
            wallet,
            gateway,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn contract_address(&self) -> &Address {
        &self.config.contract_address
    }

    /// Kind and chain compatibility of the injected wallet
    pub fn wallet_info(&self) -> Option<WalletInfo> {
        self.wallet.as_ref().map(|w| WalletInfo {
            kind: w.kind(),
            compatibility: w.compatibility(&self.config.chain.chain_id),
        })
    }

    fn wallet(&self) -> Result<&Arc<dyn WalletSigner>> {
        self.wallet.as_ref().ok_or(CapsuleError::WalletUnavailable)
    }

    /// Prompt the wallet for approval and return its first account
    pub async fn connect(&self) -> Result<Address> {
        let wallet = self.wallet()?;
        let chain_id = &self.config.chain.chain_id;

        if let Compatibility::Partial { reason } = wallet.compatibility(chain_id) {
            tracing::warn!(
                wallet = %wallet.kind(),
                %chain_id,
                reason = %reason,
                "Wallet has partial chain support"
            );
        }

        wallet.enable(chain_id).await.map_err(wallet_rejected)?;
        let signer = wallet.offline_signer(chain_id).await.map_err(wallet_rejected)?;
        let accounts = signer.accounts().await.map_err(wallet_rejected)?;

        let account = accounts
            .into_iter()
            .next()
            .ok_or_else(|| wallet_rejected(WalletError::NoAccounts))?;

        tracing::info!(wallet = %wallet.kind(), address = %account.address, "Connected to wallet");
        Ok(account.address)
    }

    /// Store `message` for `owner`, unlocking at `unlock_time`.
    ///
    /// Input is validated before the wallet is touched.
    pub async fn create_capsule(
        &self,
        owner: &Address,
        message: &str,
        unlock_time: UnixSeconds,
    ) -> Result<TxReceipt> {
        let request = build_create_request(message, unlock_time)?;
        let owner = validate_address(owner.as_str())?;

        let wallet = self.wallet()?;
        let chain_id = &self.config.chain.chain_id;

        wallet.enable(chain_id).await.map_err(signing_failed)?;
        let signer = wallet.offline_signer(chain_id).await.map_err(signing_failed)?;

        let client = self
            .gateway
            .signing
            .connect_with_signer(&self.config.chain.rpc_url, signer)
            .await
            .map_err(|e| CapsuleError::SigningFailed {
                message: e.to_string(),
            })?;

        let result = client
            .execute(
                &owner,
                &self.config.contract_address,
                &request.to_json(),
                &FeeMode::Auto,
                &self.config.memo,
                &[],
            )
            .await
            .map_err(|e| match e {
                ChainError::Signing { message } => CapsuleError::SigningFailed { message },
                other => CapsuleError::ExecutionFailed {
                    message: other.to_string(),
                },
            })?;

        tracing::info!(
            %owner,
            unlock_time,
            tx_hash = %result.transaction_hash,
            "Stored time capsule message"
        );

        Ok(TxReceipt {
            transaction_hash: result.transaction_hash,
            owner,
            unlock_time: request.unlock_time(),
        })
    }

    /// Fetch the capsule stored by `owner`.
    ///
    /// `Ok(None)` means the contract holds no capsule for this owner.
    pub async fn fetch_capsule(&self, owner: &str) -> Result<Option<Capsule>> {
        let request = build_query_request(owner)?;

        let raw = match self
            .gateway
            .querier
            .query_contract_smart(&self.config.contract_address, &request.to_json())
            .await
        {
            Ok(raw) => raw,
            Err(ChainError::NotFound { message }) => {
                tracing::debug!(owner = %request.owner(), message = %message, "No capsule stored");
                return Ok(None);
            }
            Err(e) => {
                return Err(CapsuleError::QueryFailed {
                    message: e.to_string(),
                })
            }
        };

        if raw.is_null() {
            return Err(CapsuleError::QueryFailed {
                message: "Failed to get response from contract".to_string(),
            });
        }

        let response: MessageResponse =
            serde_json::from_value(raw).map_err(|e| CapsuleError::QueryFailed {
                message: format!("Unexpected query response: {}", e),
            })?;

        let capsule = Capsule::from_response(request.owner().clone(), response);
        tracing::debug!(?capsule, "Fetched capsule");
        Ok(Some(capsule))
    }
}

fn wallet_rejected(e: WalletError) -> CapsuleError {
    CapsuleError::WalletRejected {
        reason: e.to_string(),
    }
}

fn signing_failed(e: WalletError) -> CapsuleError {
    CapsuleError::SigningFailed {
        message: e.to_string(),
    }
}
