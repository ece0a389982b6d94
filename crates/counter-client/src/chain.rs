//! The chain-facing service interface.

use async_trait::async_trait;
use thiserror::Error;

use counter_wire::{Address, Blockhash};

/// Errors surfaced by chain access.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport-level failure. Reads are safe to retry manually;
    /// submissions are not, since the first attempt may have landed.
    #[error("network error: {0}")]
    Network(String),

    /// No account exists at the queried address.
    #[error("account not found")]
    NotFound,

    /// The network rejected the transaction before executing it. No state
    /// change occurred.
    #[error("submission rejected: {0}")]
    Submission(String),

    /// The network did not report the transaction finalized in time. The
    /// transaction may still land; callers must keep its signature visible.
    #[error("confirmation timed out after {0} seconds")]
    ConfirmationTimeout(u64),

    /// The network finalized the transaction and the program rejected it.
    /// The wrapped error comes from the program and is opaque here.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
}

/// Network operations the synchronization flow depends on.
///
/// Every method is a suspension point and can fail. [`crate::RpcClient`]
/// implements this against a JSON-RPC endpoint; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch the raw data of an account.
    async fn fetch_account(&self, address: &Address) -> Result<Vec<u8>, ChainError>;

    /// Fetch a recent blockhash to stamp an outgoing transaction with.
    async fn fetch_recent_blockhash(&self) -> Result<Blockhash, ChainError>;

    /// Submit a signed transaction, returning its signature.
    async fn submit(&self, signed_tx: &[u8]) -> Result<String, ChainError>;

    /// Wait until the network reports the transaction finalized.
    async fn await_confirmation(&self, signature: &str) -> Result<(), ChainError>;

    /// Current slot. Used purely as a display marker; callers treat failure
    /// as non-fatal.
    async fn fetch_slot(&self) -> Result<u64, ChainError>;

    /// Request a faucet airdrop (test networks only), returning the airdrop
    /// transaction signature.
    async fn request_airdrop(&self, address: &Address, lamports: u64)
        -> Result<String, ChainError>;

    /// Minimum balance for an account of `space` bytes to stay rent exempt.
    async fn minimum_balance_for_rent_exemption(&self, space: u64) -> Result<u64, ChainError>;
}
