//! Contract queries over the chain's REST (LCD) endpoint
//!
//! `GET {lcd}/cosmwasm/wasm/v1/contract/{address}/smart/{base64(query)}`
//! returns `{"data": <query result>}`.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use capsule_core::{Address, AppConfig, ChainError};
use reqwest::StatusCode;
use serde_json::Value;

use crate::gateway::ContractQuerier;

/// LCD-backed [`ContractQuerier`]
#[derive(Clone)]
pub struct LcdQuerier {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl LcdQuerier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
        let base_url = base_url.into();
        let http = reqwest::Client::builder()
            .user_agent("time-capsule")
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Unreachable {
                url: format!("{}: {}", base_url, e),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ChainError> {
        Self::new(
            config.chain.lcd_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for a smart query. The query JSON is base64 encoded with the
    /// URL-safe alphabet so it stays a single path segment.
    pub fn smart_query_url(&self, contract: &Address, msg: &Value) -> String {
        let encoded = URL_SAFE.encode(msg.to_string());
        format!(
            "{}/cosmwasm/wasm/v1/contract/{}/smart/{}",
            self.base_url, contract, encoded
        )
    }

    fn map_send_error(&self, e: reqwest::Error) -> ChainError {
        if e.is_timeout() {
            ChainError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            ChainError::Unreachable {
                url: format!("{}: {}", self.base_url, e),
            }
        } else {
            ChainError::ApiError {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ContractQuerier for LcdQuerier {
    async fn query_contract_smart(
        &self,
        contract: &Address,
        msg: &Value,
    ) -> Result<Value, ChainError> {
        let url = self.smart_query_url(contract, msg);
        tracing::debug!(%contract, "LCD smart query");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let json: Value =
            serde_json::from_str(&body).map_err(|e| ChainError::ParseError(e.to_string()))?;
        Ok(json.get("data").cloned().unwrap_or(Value::Null))
    }
}

/// Map a non-success LCD response to a gateway error.
///
/// Only the contract's missing storage key error counts as `NotFound`; it
/// arrives as a gRPC-gateway JSON body whose message reads
/// `type: <path>::Capsule; key: [..] not found`. Anything else, including a
/// bare 404 from a wrong base URL or proxy, is an API error.
fn classify_error(status: StatusCode, body: &str) -> ChainError {
    let grpc_message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    match grpc_message {
        Some(message) if is_missing_capsule(&message) => ChainError::NotFound { message },
        Some(message) => ChainError::ApiError {
            message: format!("HTTP {}: {}", status.as_u16(), message),
        },
        None => ChainError::ApiError {
            message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
        },
    }
}

fn is_missing_capsule(message: &str) -> bool {
    message.contains("type: ")
        && message.contains("::Capsule; key: ")
        && message.contains("not found")
}
