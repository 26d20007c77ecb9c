//! capsule-core: Shared types, errors, configuration and time utilities
//!
//! This crate provides the foundational types used across the Time Capsule workspace.

pub mod config;
pub mod errors;
pub mod time;
pub mod types;

pub use config::*;
pub use errors::*;
pub use time::{Clock, ManualClock, SystemClock};
pub use types::*;
