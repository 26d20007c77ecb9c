//! Request builders
//!
//! Pure and synchronous: validate local input and produce the exact message
//! the contract expects. Nothing here touches a wallet or the network.

use capsule_core::{Address, UnixSeconds, ValidationError};
use serde_json::Value;

use crate::msg::{ExecuteMsg, QueryMsg};

/// bech32 data-part alphabet
const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// bech32 checksum length
const CHECKSUM_LEN: usize = 6;

/// bech32 maximum total length
const MAX_ADDRESS_LEN: usize = 90;

/// A validated store request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    msg: ExecuteMsg,
}

impl CreateRequest {
    pub fn msg(&self) -> &ExecuteMsg {
        &self.msg
    }

    pub fn unlock_time(&self) -> UnixSeconds {
        match &self.msg {
            ExecuteMsg::StoreMessage { unlock_time, .. } => {
                UnixSeconds::try_from(*unlock_time).unwrap_or(UnixSeconds::MAX)
            }
        }
    }

    /// JSON body passed to `execute`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.msg).unwrap_or(Value::Null)
    }
}

/// A validated query request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    owner: Address,
    msg: QueryMsg,
}

impl QueryRequest {
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn msg(&self) -> &QueryMsg {
        &self.msg
    }

    /// JSON body passed to `query_contract_smart`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.msg).unwrap_or(Value::Null)
    }
}

/// Build a `store_message` request.
///
/// The message is sent verbatim; only an empty (or whitespace-only) message
/// is rejected. The unlock time must be a positive Unix timestamp.
pub fn build_create_request(
    message: &str,
    unlock_time: UnixSeconds,
) -> Result<CreateRequest, ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if unlock_time <= 0 {
        return Err(ValidationError::unlock_time(unlock_time));
    }

    Ok(CreateRequest {
        msg: ExecuteMsg::StoreMessage {
            message: message.to_string(),
            unlock_time: unlock_time as u64,
        },
    })
}

/// Build a `get_message` request for `owner`
pub fn build_query_request(owner: &str) -> Result<QueryRequest, ValidationError> {
    let owner = validate_address(owner)?;
    Ok(QueryRequest {
        msg: QueryMsg::GetMessage {
            owner: owner.as_str().to_string(),
        },
        owner,
    })
}

/// Validate that an address has bech32 shape.
///
/// This performs format validation only:
/// - non-empty human readable prefix, then the last '1' as separator
/// - data part from the bech32 charset, at least the 6 checksum characters
/// - no mixed case, at most 90 characters
///
/// The checksum itself is not verified; the chain does that.
pub fn validate_address(address: &str) -> Result<Address, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    if address.is_empty() {
        return Err(invalid("address is empty".to_string()));
    }
    if address.len() > MAX_ADDRESS_LEN {
        return Err(invalid(format!(
            "too long ({} chars, maximum {})",
            address.len(),
            MAX_ADDRESS_LEN
        )));
    }

    let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = address.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(invalid("mixed case".to_string()));
    }
    let normalized = address.to_ascii_lowercase();

    let sep = normalized
        .rfind('1')
        .ok_or_else(|| invalid("missing '1' separator".to_string()))?;
    let (hrp, data) = (&normalized[..sep], &normalized[sep + 1..]);

    if hrp.is_empty() {
        return Err(invalid("missing human readable prefix".to_string()));
    }
    if let Some(c) = hrp.chars().find(|c| !('!'..='~').contains(c)) {
        return Err(invalid(format!("invalid prefix character {:?}", c)));
    }
    if data.len() < CHECKSUM_LEN {
        return Err(invalid(format!(
            "data part too short ({} chars, minimum {})",
            data.len(),
            CHECKSUM_LEN
        )));
    }
    if let Some(c) = data.chars().find(|c| !BECH32_CHARSET.contains(*c)) {
        return Err(invalid(format!("invalid bech32 character {:?}", c)));
    }

    Ok(Address::new(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OWNER: &str = "nibi1qyqszqgpqyqszqgpqyqszqgpqyqszqgpd5wd8w";

    #[test]
    fn test_create_request_shape() {
        let req = build_create_request("Hello future me", 1_893_456_000).unwrap();
        assert_eq!(
            req.to_json(),
            json!({"store_message": {"message": "Hello future me", "unlock_time": 1893456000u64}})
        );
        assert_eq!(req.unlock_time(), 1_893_456_000);
    }

    #[test]
    fn test_create_request_rejects_empty_message() {
        assert_eq!(
            build_create_request("", 1_893_456_000),
            Err(ValidationError::EmptyMessage)
        );
        assert_eq!(
            build_create_request("  \n\t", 1_893_456_000),
            Err(ValidationError::EmptyMessage)
        );
    }

    #[test]
    fn test_create_request_rejects_non_positive_unlock_time() {
        assert_eq!(
            build_create_request("hi", 0),
            Err(ValidationError::InvalidUnlockTime { value: 0 })
        );
        assert_eq!(
            build_create_request("hi", -1),
            Err(ValidationError::InvalidUnlockTime { value: -1 })
        );
    }

    #[test]
    fn test_create_request_keeps_message_verbatim() {
        let req = build_create_request("  padded  ", 1).unwrap();
        assert_eq!(req.to_json()["store_message"]["message"], "  padded  ");
    }

    #[test]
    fn test_query_request_shape() {
        let req = build_query_request(OWNER).unwrap();
        assert_eq!(req.to_json(), json!({"get_message": {"owner": OWNER}}));
        assert_eq!(req.owner().as_str(), OWNER);
    }

    #[test]
    fn test_query_request_normalizes_uppercase() {
        let req = build_query_request(&OWNER.to_ascii_uppercase()).unwrap();
        assert_eq!(req.owner().as_str(), OWNER);
    }

    #[test]
    fn test_validate_address_rejections() {
        let cases = [
            "",
            "nibiqyqszqgpqyqszqgp",
            "1qyqszqgpqyqszqgp",
            "nibi1abc",
            "nibi1qyqszqgpqyqszqgpb",
            "nibi1Qyqszqgpqyqszqgp",
        ];
        for case in cases {
            assert!(
                matches!(
                    validate_address(case),
                    Err(ValidationError::InvalidAddress { .. })
                ),
                "expected {:?} to be rejected",
                case
            );
        }

        let too_long = format!("nibi1{}", "q".repeat(90));
        assert!(validate_address(&too_long).is_err());
    }
}
