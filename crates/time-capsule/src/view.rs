//! View state derived from a fetched capsule and the current time
//!
//! Status comes only from the contract's `is_unlocked` flag. The local
//! countdown is informational: ticking recomputes `remaining` but never moves
//! a capsule from `Locked` to `Unlocked`; only a fresh fetch can.

use capsule_core::time::{self, format_remaining};
use capsule_core::{Address, UnixSeconds};
use serde::Serialize;

use crate::state::Capsule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewStatus {
    NoCapsule,
    Locked,
    Unlocked,
}

/// What the UI may render for the connected owner's capsule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CapsuleView {
    #[default]
    NoCapsule,
    #[serde(rename_all = "camelCase")]
    Locked {
        owner: Address,
        unlock_time: UnixSeconds,
        /// Seconds until unlock by the local clock, may go negative
        remaining: i64,
    },
    #[serde(rename_all = "camelCase")]
    Unlocked {
        owner: Address,
        unlock_time: UnixSeconds,
        message: String,
    },
}

/// Derive the view for `capsule` at `now`
pub fn derive_view_state(capsule: Option<&Capsule>, now: UnixSeconds) -> CapsuleView {
    let Some(capsule) = capsule else {
        return CapsuleView::NoCapsule;
    };

    match capsule.message() {
        Some(message) => CapsuleView::Unlocked {
            owner: capsule.owner().clone(),
            unlock_time: capsule.unlock_time(),
            message: message.to_string(),
        },
        None => CapsuleView::Locked {
            owner: capsule.owner().clone(),
            unlock_time: capsule.unlock_time(),
            remaining: time::remaining(capsule.unlock_time(), now),
        },
    }
}

impl CapsuleView {
    pub fn status(&self) -> ViewStatus {
        match self {
            Self::NoCapsule => ViewStatus::NoCapsule,
            Self::Locked { .. } => ViewStatus::Locked,
            Self::Unlocked { .. } => ViewStatus::Unlocked,
        }
    }

    pub fn has_capsule(&self) -> bool {
        !matches!(self, Self::NoCapsule)
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    pub fn unlock_time(&self) -> Option<UnixSeconds> {
        match self {
            Self::NoCapsule => None,
            Self::Locked { unlock_time, .. } | Self::Unlocked { unlock_time, .. } => {
                Some(*unlock_time)
            }
        }
    }

    pub fn remaining(&self) -> Option<i64> {
        match self {
            Self::Locked { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }

    /// Message to render; `None` unless unlocked
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Unlocked { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Countdown label while locked, e.g. "1d 2h" or "Unlocked now"
    pub fn countdown(&self) -> Option<String> {
        self.remaining().map(format_remaining)
    }

    /// Recompute the countdown for `now`. Status is left untouched.
    pub fn tick(&self, now: UnixSeconds) -> Self {
        match self {
            Self::Locked {
                owner, unlock_time, ..
            } => Self::Locked {
                owner: owner.clone(),
                unlock_time: *unlock_time,
                remaining: time::remaining(*unlock_time, now),
            },
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: UnixSeconds = 1_800_000_000;

    fn owner() -> Address {
        Address::new("nibi1qyqszqgpqyqszqgpqyqszqgpqyqszqgpd5wd8w")
    }

    #[test]
    fn test_no_capsule() {
        let view = derive_view_state(None, NOW);
        assert_eq!(view.status(), ViewStatus::NoCapsule);
        assert!(!view.has_capsule());
        assert_eq!(view.countdown(), None);
    }

    #[test]
    fn test_locked_hides_message() {
        let capsule = Capsule::new(owner(), "secret", NOW + 3600, false);
        let view = derive_view_state(Some(&capsule), NOW);
        assert_eq!(view.status(), ViewStatus::Locked);
        assert_eq!(view.remaining(), Some(3600));
        assert_eq!(view.message(), None);
        assert_eq!(view.countdown().as_deref(), Some("1h"));

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"status\":\"locked\""));
    }

    #[test]
    fn test_unlocked_exposes_message() {
        let capsule = Capsule::new(owner(), "secret", NOW - 10, true);
        let view = derive_view_state(Some(&capsule), NOW);
        assert_eq!(view.status(), ViewStatus::Unlocked);
        assert_eq!(view.message(), Some("secret"));
        assert_eq!(view.remaining(), None);
    }

    #[test]
    fn test_authoritative_flag_wins_over_clock() {
        // unlock time passed locally, but the contract still says locked
        let capsule = Capsule::new(owner(), "secret", NOW - 100, false);
        let view = derive_view_state(Some(&capsule), NOW);
        assert_eq!(view.status(), ViewStatus::Locked);
        assert_eq!(view.message(), None);
        assert_eq!(view.countdown().as_deref(), Some("Unlocked now"));

        // contract says unlocked even though the local clock lags behind
        let capsule = Capsule::new(owner(), "secret", NOW + 100, true);
        let view = derive_view_state(Some(&capsule), NOW);
        assert_eq!(view.status(), ViewStatus::Unlocked);
    }

    #[test]
    fn test_tick_never_unlocks() {
        let capsule = Capsule::new(owner(), "secret", NOW + 5, false);
        let view = derive_view_state(Some(&capsule), NOW);

        let later = view.tick(NOW + 3);
        assert_eq!(later.remaining(), Some(2));

        let past = view.tick(NOW + 60);
        assert_eq!(past.status(), ViewStatus::Locked);
        assert_eq!(past.remaining(), Some(-55));
        assert_eq!(past.message(), None);
    }

    #[test]
    fn test_tick_leaves_other_states_alone() {
        assert_eq!(CapsuleView::NoCapsule.tick(NOW), CapsuleView::NoCapsule);

        let capsule = Capsule::new(owner(), "secret", NOW - 10, true);
        let view = derive_view_state(Some(&capsule), NOW);
        assert_eq!(view.tick(NOW + 1000), view);
    }
}
