//! Capsule creation flow
//!
//! `Idle -> Connecting -> Connected -> Submitting -> Confirmed | Failed`.
//! `Connecting` and `Submitting` are the only states waiting on the wallet or
//! chain. `Confirmed` and `Failed` end an attempt; the next attempt starts
//! again from `Idle`.

use capsule_core::{Address, TxHash};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum FlowState {
    #[default]
    Idle,
    Connecting,
    Connected {
        address: Address,
    },
    Submitting {
        address: Address,
    },
    #[serde(rename_all = "camelCase")]
    Confirmed {
        tx_hash: TxHash,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    Start,
    WalletConnected(Address),
    Submit,
    Confirmed(TxHash),
    Failed(String),
}

impl FlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::WalletConnected(_) => "wallet_connected",
            Self::Submit => "submit",
            Self::Confirmed(_) => "confirmed",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid flow transition: {event} while {from}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub event: &'static str,
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected { .. } => "connected",
            Self::Submitting { .. } => "submitting",
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Waiting on the wallet or chain
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Connecting | Self::Submitting { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Failed { .. })
    }

    /// Apply `event`, returning the next state
    pub fn apply(&self, event: FlowEvent) -> Result<FlowState, InvalidTransition> {
        let next = match (self, &event) {
            (Self::Idle, FlowEvent::Start) => Self::Connecting,
            (Self::Connecting, FlowEvent::WalletConnected(address)) => Self::Connected {
                address: address.clone(),
            },
            (Self::Connected { address }, FlowEvent::Submit) => Self::Submitting {
                address: address.clone(),
            },
            (Self::Submitting { .. }, FlowEvent::Confirmed(tx_hash)) => Self::Confirmed {
                tx_hash: tx_hash.clone(),
            },
            (
                Self::Connecting | Self::Connected { .. } | Self::Submitting { .. },
                FlowEvent::Failed(reason),
            ) => Self::Failed {
                reason: reason.clone(),
            },
            _ => {
                return Err(InvalidTransition {
                    from: self.name(),
                    event: event.name(),
                })
            }
        };
        Ok(next)
    }
}
