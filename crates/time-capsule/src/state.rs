//! Capsule record as seen by the client

use std::fmt;

use capsule_core::{Address, UnixSeconds};

use crate::msg::MessageResponse;

/// A stored capsule, as last reported by the contract.
///
/// The message is only reachable through [`Capsule::message`], which yields
/// nothing while the contract reports the capsule as locked. `Debug` output
/// redacts it under the same rule.
#[derive(Clone, PartialEq, Eq)]
pub struct Capsule {
    owner: Address,
    message: String,
    unlock_time: UnixSeconds,
    is_unlocked: bool,
}

impl Capsule {
    pub fn new(
        owner: Address,
        message: impl Into<String>,
        unlock_time: UnixSeconds,
        is_unlocked: bool,
    ) -> Self {
        Self {
            owner,
            message: message.into(),
            unlock_time,
            is_unlocked,
        }
    }

    /// Build from a query response. The queried owner wins over whatever the
    /// contract echoes back.
    pub fn from_response(owner: Address, response: MessageResponse) -> Self {
        if let Some(echoed) = response.owner.as_deref() {
            if echoed != owner.as_str() {
                tracing::warn!(
                    queried = %owner,
                    echoed,
                    "Contract echoed a different owner"
                );
            }
        }
        Self {
            owner,
            message: response.message,
            // out-of-range times stay locked rather than wrapping negative
            unlock_time: UnixSeconds::try_from(response.unlock_time).unwrap_or(UnixSeconds::MAX),
            is_unlocked: response.is_unlocked,
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn unlock_time(&self) -> UnixSeconds {
        self.unlock_time
    }

    /// Authoritative flag from the contract
    pub fn is_unlocked(&self) -> bool {
        self.is_unlocked
    }

    /// The message, only once the contract reports the capsule unlocked
    pub fn message(&self) -> Option<&str> {
        self.is_unlocked.then_some(self.message.as_str())
    }
}

impl fmt::Debug for Capsule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capsule")
            .field("owner", &self.owner)
            .field("message", &self.message().unwrap_or("<locked>"))
            .field("unlock_time", &self.unlock_time)
            .field("is_unlocked", &self.is_unlocked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::new("nibi1qyqszqgpqyqszqgpqyqszqgpqyqszqgpd5wd8w")
    }

    #[test]
    fn test_locked_message_hidden() {
        let capsule = Capsule::new(owner(), "secret", 2_000_000_000, false);
        assert_eq!(capsule.message(), None);
        let debug = format!("{:?}", capsule);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<locked>"));
    }

    #[test]
    fn test_unlocked_message_visible() {
        let capsule = Capsule::new(owner(), "secret", 10, true);
        assert_eq!(capsule.message(), Some("secret"));
        assert!(format!("{:?}", capsule).contains("secret"));
    }

    #[test]
    fn test_from_response_uses_queried_owner() {
        let response = MessageResponse {
            message: "secret".into(),
            owner: Some("nibi1other".into()),
            unlock_time: 1_893_456_000,
            is_unlocked: false,
        };
        let capsule = Capsule::from_response(owner(), response);
        assert_eq!(capsule.owner(), &owner());
        assert_eq!(capsule.unlock_time(), 1_893_456_000);
        assert!(!capsule.is_unlocked());
    }

    #[test]
    fn test_from_response_saturates_unlock_time() {
        let response = MessageResponse {
            message: "This message is still locked.".into(),
            owner: None,
            unlock_time: u64::MAX,
            is_unlocked: false,
        };
        let capsule = Capsule::from_response(owner(), response);
        assert_eq!(capsule.unlock_time(), UnixSeconds::MAX);

        let view = crate::derive_view_state(Some(&capsule), 1_800_000_000);
        assert!(view.remaining().unwrap() > 0);
        assert_ne!(view.countdown().as_deref(), Some("Unlocked now"));
    }
}
