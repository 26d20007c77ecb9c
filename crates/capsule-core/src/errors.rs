//! Error types for Time Capsule

use thiserror::Error;

use crate::UnixSeconds;

/// Errors surfaced by capsule operations
///
/// "No capsule stored for this owner" is deliberately absent: a fetch that
/// finds nothing returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum CapsuleError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Wallet extension is not available")]
    WalletUnavailable,

    #[error("Wallet request was rejected: {reason}")]
    WalletRejected { reason: String },

    #[error("Failed to sign transaction: {message}")]
    SigningFailed { message: String },

    #[error("Contract execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("Contract query failed: {message}")]
    QueryFailed { message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Bad local input, detected before any wallet or chain call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Unlock time must be a positive Unix timestamp (got {value})")]
    InvalidUnlockTime { value: i64 },

    #[error("Please set an unlock time (could not parse {value:?})")]
    InvalidDateTime { value: String },

    #[error("Local time {value} does not exist in this timezone")]
    NonexistentLocalTime { value: String },

    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Please connect your wallet first")]
    NotConnected,
}

/// Errors reported by a wallet backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Chain {chain_id} is not supported by this wallet")]
    ChainNotSupported { chain_id: String },

    #[error("Failed to get offline signer")]
    SignerUnavailable,

    #[error("Wallet exposes no accounts")]
    NoAccounts,

    #[error("Wallet error: {message}")]
    Other { message: String },
}

/// Errors reported by a chain gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("RPC endpoint unreachable at {url}")]
    Unreachable { url: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Endpoint returned error: {message}")]
    ApiError { message: String },

    #[error("No record found: {message}")]
    NotFound { message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Signing failed: {message}")]
    Signing { message: String },

    #[error("Transaction rejected: {message}")]
    Rejected { message: String },
}

/// Result type alias for capsule operations
pub type Result<T> = std::result::Result<T, CapsuleError>;

impl CapsuleError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::WalletUnavailable => "wallet_unavailable",
            Self::WalletRejected { .. } => "wallet_rejected",
            Self::SigningFailed { .. } => "signing_failed",
            Self::ExecutionFailed { .. } => "execution_failed",
            Self::QueryFailed { .. } => "query_failed",
            Self::Config(_) => "config_error",
        }
    }

    /// Short heading for a user notification
    pub fn title(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::NotConnected) => "Wallet not connected",
            Self::Validation(_) => "Invalid input",
            Self::WalletUnavailable => "Please install Leap wallet extension",
            Self::WalletRejected { .. } => "Failed to connect wallet",
            Self::SigningFailed { .. } | Self::ExecutionFailed { .. } => {
                "Failed to store message"
            }
            Self::QueryFailed { .. } => "Failed to retrieve message",
            Self::Config(_) => "Configuration error",
        }
    }
}

impl ValidationError {
    /// Shorthand for a rejected unlock time
    pub fn unlock_time(value: UnixSeconds) -> Self {
        Self::InvalidUnlockTime { value }
    }
}
