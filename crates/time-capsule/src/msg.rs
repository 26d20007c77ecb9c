//! Contract message shapes
//!
//! These mirror the deployed contract's JSON interface exactly:
//! `{"store_message":{...}}`, `{"get_message":{...}}` and the flat
//! `MessageResponse` returned by the query.

use serde::{Deserialize, Serialize};

/// Text the contract puts in `message` while a capsule is still locked
pub const LOCKED_PLACEHOLDER: &str = "This message is still locked.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    StoreMessage { message: String, unlock_time: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    GetMessage { owner: String },
}

/// Response to `get_message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    /// Echoed by the contract; older deployments omit it
    #[serde(default)]
    pub owner: Option<String>,
    pub unlock_time: u64,
    pub is_unlocked: bool,
}
