//! Time Capsule application library
//!
//! Wires configuration, the LCD querier and an injected wallet into a
//! [`CapsuleSession`].

pub mod countdown;
pub mod notify;
pub mod session;

use std::sync::Arc;

use capsule_client::{CapsuleClient, ChainGateway, LcdQuerier, SigningClientFactory, WalletSigner};
use capsule_core::{AppConfig, CapsuleError, Clock, SystemClock};

pub use countdown::Countdown;
pub use notify::{Level, Notification};
pub use session::CapsuleSession;

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,time_capsule=debug";

/// Install the global tracing subscriber
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();
}

/// Build a session that queries through the configured LCD endpoint
pub fn build_session(
    config: AppConfig,
    wallet: Option<Arc<dyn WalletSigner>>,
    signing: Arc<dyn SigningClientFactory>,
) -> Result<CapsuleSession, CapsuleError> {
    build_session_with_clock(config, wallet, signing, Arc::new(SystemClock))
}

pub fn build_session_with_clock(
    config: AppConfig,
    wallet: Option<Arc<dyn WalletSigner>>,
    signing: Arc<dyn SigningClientFactory>,
    clock: Arc<dyn Clock>,
) -> Result<CapsuleSession, CapsuleError> {
    config.validate()?;

    let querier =
        LcdQuerier::from_config(&config).map_err(|e| CapsuleError::Config(e.to_string()))?;
    tracing::info!(
        chain_id = %config.chain.chain_id,
        lcd = querier.base_url(),
        contract = %config.contract_address,
        "Starting Time Capsule session"
    );

    if let Some(wallet) = &wallet {
        let compatibility = wallet.compatibility(&config.chain.chain_id);
        if !compatibility.is_full() {
            tracing::warn!(wallet = %wallet.kind(), "Wallet has partial support for this chain");
        }
    } else {
        tracing::warn!("No wallet extension available");
    }

    let gateway = ChainGateway::new(signing, Arc::new(querier));
    let client = CapsuleClient::new(config, wallet, gateway);
    Ok(CapsuleSession::new(client, clock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsule_client::mock::{MockChain, MockWallet};
    use capsule_core::Address;

    fn config() -> AppConfig {
        AppConfig {
            contract_address: Address::new("nibi1contractqyqszqgpqyqszqgpqyqszqgp"),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_build_session() {
        let chain = MockChain::new(0);
        let wallet: Arc<dyn WalletSigner> = Arc::new(MockWallet::leap(vec![Address::new(
            "nibi1qyqszqgpqyqszqgpqyqszqgpqyqszqgpd5wd8w",
        )]));

        let session = build_session(config(), Some(wallet), Arc::new(chain)).unwrap();
        assert_eq!(
            session.client().contract_address().as_str(),
            "nibi1contractqyqszqgpqyqszqgpqyqszqgp"
        );
        assert!(session.address().await.is_none());
    }

    #[test]
    fn test_build_session_requires_contract() {
        let chain = MockChain::new(0);
        let err = build_session(AppConfig::default(), None, Arc::new(chain))
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "config_error");
    }
}
