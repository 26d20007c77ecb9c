//! Time Capsule contract protocol
//!
//! A capsule is a message stored under its owner's address together with a
//! Unix timestamp. The contract only reveals the message once its block time
//! has reached the unlock time.

pub mod msg;
pub mod request;
pub mod state;
pub mod view;

pub use msg::{ExecuteMsg, MessageResponse, QueryMsg, LOCKED_PLACEHOLDER};
pub use request::{
    build_create_request, build_query_request, validate_address, CreateRequest, QueryRequest,
};
pub use state::Capsule;
pub use view::{derive_view_state, CapsuleView, ViewStatus};
