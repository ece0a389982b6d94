//! JSON-RPC chain access.
//!
//! A thin hand-rolled JSON-RPC 2.0 client covering the handful of methods
//! the synchronization flow needs: `getAccountInfo`, `getLatestBlockhash`,
//! `sendTransaction`, `getSignatureStatuses`, `getSlot`, plus the two
//! provisioning helpers `requestAirdrop` and
//! `getMinimumBalanceForRentExemption`. Account data and transactions ride
//! base64; addresses, blockhashes, and signatures ride Base58.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use tracing::{debug, warn};

use counter_wire::{Address, Blockhash};

use crate::chain::{ChainClient, ChainError};

/// Default ceiling on confirmation polling.
const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between signature status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// JSON-RPC implementation of [`ChainClient`].
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

/// Where a call failed: before reaching the node, or inside it.
enum RpcFailure {
    Transport(String),
    Rpc(String),
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the confirmation polling window.
    pub fn with_confirmation(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.confirm_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!(method, "rpc request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcFailure::Transport(format!("{method}: {e}")))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| RpcFailure::Transport(format!("{method}: invalid response body: {e}")))?;

        if let Some(err) = payload.get("error").filter(|e| !e.is_null()) {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| err.to_string());
            return Err(RpcFailure::Rpc(format!("{method}: {message}")));
        }

        payload
            .get("result")
            .cloned()
            .ok_or_else(|| RpcFailure::Transport(format!("{method}: response missing result")))
    }
}

/// For read methods every failure is a transport-class error.
fn read_error(failure: RpcFailure) -> ChainError {
    match failure {
        RpcFailure::Transport(e) | RpcFailure::Rpc(e) => ChainError::Network(e),
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn fetch_account(&self, address: &Address) -> Result<Vec<u8>, ChainError> {
        let result = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), {"encoding": "base64"}]),
            )
            .await
            .map_err(read_error)?;
        parse_account_data(&result)
    }

    async fn fetch_recent_blockhash(&self) -> Result<Blockhash, ChainError> {
        let result = self
            .call("getLatestBlockhash", json!([]))
            .await
            .map_err(read_error)?;
        parse_blockhash(&result)
    }

    async fn submit(&self, signed_tx: &[u8]) -> Result<String, ChainError> {
        let encoded = BASE64.encode(signed_tx);
        let result = self
            .call("sendTransaction", json!([encoded, {"encoding": "base64"}]))
            .await
            .map_err(|failure| match failure {
                RpcFailure::Transport(e) => ChainError::Network(e),
                // The node rejected the transaction before execution.
                RpcFailure::Rpc(e) => ChainError::Submission(e),
            })?;

        result
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ChainError::Network("sendTransaction: non-string signature".into()))
    }

    async fn await_confirmation(&self, signature: &str) -> Result<(), ChainError> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        loop {
            let result = self
                .call(
                    "getSignatureStatuses",
                    json!([[signature], {"searchTransactionHistory": true}]),
                )
                .await;

            match result {
                Ok(result) => match parse_signature_status(&result)? {
                    SignatureStatus::Finalized => {
                        debug!(signature, "transaction finalized");
                        return Ok(());
                    }
                    SignatureStatus::Failed(program_err) => {
                        return Err(ChainError::TransactionFailed(program_err));
                    }
                    SignatureStatus::Pending => {}
                },
                // Transient poll failures do not decide the outcome; keep
                // polling until the deadline does.
                Err(failure) => warn!(error = %read_error(failure), "status poll failed"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ChainError::ConfirmationTimeout(
                    self.confirm_timeout.as_secs(),
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn fetch_slot(&self) -> Result<u64, ChainError> {
        let result = self.call("getSlot", json!([])).await.map_err(read_error)?;
        result
            .as_u64()
            .ok_or_else(|| ChainError::Network("getSlot: non-numeric result".into()))
    }

    async fn request_airdrop(
        &self,
        address: &Address,
        lamports: u64,
    ) -> Result<String, ChainError> {
        let result = self
            .call("requestAirdrop", json!([address.to_string(), lamports]))
            .await
            .map_err(read_error)?;
        result
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ChainError::Network("requestAirdrop: non-string signature".into()))
    }

    async fn minimum_balance_for_rent_exemption(&self, space: u64) -> Result<u64, ChainError> {
        let result = self
            .call("getMinimumBalanceForRentExemption", json!([space]))
            .await
            .map_err(read_error)?;
        result.as_u64().ok_or_else(|| {
            ChainError::Network("getMinimumBalanceForRentExemption: non-numeric result".into())
        })
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

enum SignatureStatus {
    /// Not landed, or landed but not yet past the confirmed commitment.
    Pending,
    /// Finalized and the program rejected it.
    Failed(String),
    /// Finalized successfully.
    Finalized,
}

/// `getAccountInfo` wraps its value in a context envelope; a null value
/// means the account does not exist.
fn parse_account_data(result: &Value) -> Result<Vec<u8>, ChainError> {
    let value = result
        .get("value")
        .ok_or_else(|| ChainError::Network("getAccountInfo: response missing value".into()))?;

    if value.is_null() {
        return Err(ChainError::NotFound);
    }

    // With base64 encoding requested, data arrives as ["<b64>", "base64"].
    let encoded = value
        .pointer("/data/0")
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::Network("getAccountInfo: malformed data field".into()))?;

    BASE64
        .decode(encoded)
        .map_err(|e| ChainError::Network(format!("getAccountInfo: bad base64: {e}")))
}

fn parse_blockhash(result: &Value) -> Result<Blockhash, ChainError> {
    let hash = result
        .pointer("/value/blockhash")
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::Network("getLatestBlockhash: missing blockhash".into()))?;

    let bytes = bs58::decode(hash)
        .into_vec()
        .map_err(|e| ChainError::Network(format!("getLatestBlockhash: bad base58: {e}")))?;

    bytes
        .try_into()
        .map_err(|_| ChainError::Network("getLatestBlockhash: blockhash is not 32 bytes".into()))
}

fn parse_signature_status(result: &Value) -> Result<SignatureStatus, ChainError> {
    let status = result
        .pointer("/value/0")
        .ok_or_else(|| ChainError::Network("getSignatureStatuses: response missing value".into()))?;

    if status.is_null() {
        return Ok(SignatureStatus::Pending);
    }

    if let Some(err) = status.get("err").filter(|e| !e.is_null()) {
        return Ok(SignatureStatus::Failed(err.to_string()));
    }

    match status.pointer("/confirmationStatus").and_then(Value::as_str) {
        Some("confirmed") | Some("finalized") => Ok(SignatureStatus::Finalized),
        _ => Ok(SignatureStatus::Pending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_data_decodes_base64() {
        let result = json!({
            "context": {"slot": 100},
            "value": {
                "data": [BASE64.encode([5u8, 0, 0, 0, 0, 0, 0, 0]), "base64"],
                "owner": "11111111111111111111111111111111",
                "lamports": 890_880,
            }
        });
        let data = parse_account_data(&result).unwrap();
        assert_eq!(data, vec![5, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn missing_account_maps_to_not_found() {
        let result = json!({"context": {"slot": 100}, "value": null});
        assert!(matches!(
            parse_account_data(&result),
            Err(ChainError::NotFound)
        ));
    }

    #[test]
    fn malformed_account_data_is_a_network_error() {
        let result = json!({"value": {"data": 42}});
        assert!(matches!(
            parse_account_data(&result),
            Err(ChainError::Network(_))
        ));
    }

    #[test]
    fn blockhash_roundtrips_base58() {
        let hash = [0xABu8; 32];
        let result = json!({
            "value": {"blockhash": bs58::encode(hash).into_string(), "lastValidBlockHeight": 1}
        });
        assert_eq!(parse_blockhash(&result).unwrap(), hash);
    }

    #[test]
    fn short_blockhash_is_rejected() {
        let result = json!({"value": {"blockhash": bs58::encode([1u8; 16]).into_string()}});
        assert!(parse_blockhash(&result).is_err());
    }

    #[test]
    fn null_status_is_pending() {
        let result = json!({"value": [null]});
        assert!(matches!(
            parse_signature_status(&result).unwrap(),
            SignatureStatus::Pending
        ));
    }

    #[test]
    fn processed_status_is_still_pending() {
        let result = json!({"value": [{"err": null, "confirmationStatus": "processed"}]});
        assert!(matches!(
            parse_signature_status(&result).unwrap(),
            SignatureStatus::Pending
        ));
    }

    #[test]
    fn confirmed_and_finalized_complete() {
        for status in ["confirmed", "finalized"] {
            let result = json!({"value": [{"err": null, "confirmationStatus": status}]});
            assert!(matches!(
                parse_signature_status(&result).unwrap(),
                SignatureStatus::Finalized
            ));
        }
    }

    #[test]
    fn program_error_is_surfaced() {
        let result = json!({
            "value": [{"err": {"InstructionError": [0, "Custom"]}, "confirmationStatus": "finalized"}]
        });
        match parse_signature_status(&result).unwrap() {
            SignatureStatus::Failed(err) => assert!(err.contains("InstructionError")),
            _ => panic!("expected a failed status"),
        }
    }
}
