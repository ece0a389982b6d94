use thiserror::Error;

use crate::chain::ChainError;
use crate::wallet::WalletError;

/// Errors surfaced by [`crate::CounterSession`] operations.
///
/// Every variant ends the current flow; the session records the message in
/// its observable state so a presentation layer can show it verbatim.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A mutation was requested before `connect` established an identity.
    #[error("wallet not connected")]
    NotConnected,

    /// A mutation was requested while another one was still in flight.
    /// Flows are rejected, never queued.
    #[error("another mutation is already in flight")]
    Busy,

    /// Zero deltas are pointless and never submitted (the wire format
    /// itself would permit them).
    #[error("operand must be at least 1")]
    ZeroOperand,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Wire(#[from] counter_wire::WireError),
}
