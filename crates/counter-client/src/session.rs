//! The account-state synchronization flow.
//!
//! One [`CounterSession`] carries all traffic between the embedding
//! application and the chain: it encodes instructions, routes them through
//! the wallet and the chain client, and reconciles the observable
//! [`SyncState`] with the authoritative on-chain record after every
//! confirmed mutation. The local state is a cache — it can be stale between
//! confirmations and is replaced wholesale by every fresh account fetch.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use counter_wire::{
    build_counter_instruction, compile_transaction, decode_record, Address, Operation,
};

use crate::chain::ChainClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::wallet::Wallet;

/// How many recent transaction signatures the state retains.
pub const RECENT_SIGNATURE_LIMIT: usize = 5;

/// Where a mutation flow currently stands.
///
/// A flow walks these in order; any failure drops it back to `Idle` with
/// the error recorded in [`SyncState::last_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Building,
    AwaitingSignature,
    Submitting,
    AwaitingConfirmation,
    Refreshing,
}

/// Client-local projection of the on-chain state plus flow bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Last-observed counter value.
    pub count: Option<u32>,
    /// Slot observed at the last refresh. Display only.
    pub last_slot: Option<u64>,
    /// Signature of the most recently submitted transaction. Survives
    /// confirmation failures, so a pending-or-failed transaction stays
    /// inspectable.
    pub last_signature: Option<String>,
    /// Signatures of recent confirmed mutations, newest first, capped at
    /// [`RECENT_SIGNATURE_LIMIT`].
    pub recent_signatures: Vec<String>,
    /// Message of the error that ended the last flow, if any.
    pub last_error: Option<String>,
    /// Current mutation phase.
    pub phase: Phase,
}

impl SyncState {
    /// Whether a mutation flow is currently underway.
    pub fn in_flight(&self) -> bool {
        self.phase != Phase::Idle
    }
}

/// Drives connect / refresh / mutate against one counter storage account.
///
/// Methods take `&self`, so a single session can be shared (e.g. behind an
/// `Arc`) by whatever renders its state. At most one mutation is in flight
/// per session; a second `mutate` during an active flow is rejected with
/// [`ClientError::Busy`] rather than queued.
pub struct CounterSession<C, W> {
    config: ClientConfig,
    chain: C,
    wallet: W,
    identity: Mutex<Option<Address>>,
    state: Mutex<SyncState>,
    flight: tokio::sync::Mutex<()>,
}

impl<C: ChainClient, W: Wallet> CounterSession<C, W> {
    pub fn new(config: ClientConfig, chain: C, wallet: W) -> Self {
        Self {
            config,
            chain,
            wallet,
            identity: Mutex::new(None),
            state: Mutex::new(SyncState::default()),
            flight: tokio::sync::Mutex::new(()),
        }
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Snapshot of the observable state.
    pub fn state(&self) -> SyncState {
        self.lock_state().clone()
    }

    /// The connected identity, if any.
    pub fn identity(&self) -> Option<Address> {
        *self.lock_identity()
    }

    /// Connect the wallet and run the initial state load.
    ///
    /// A failed initial load does not undo the connection: the identity is
    /// established and the load error lands in the observable state, where
    /// a later `refresh` can clear it.
    pub async fn connect(&self) -> Result<Address, ClientError> {
        let address = match self.wallet.connect().await {
            Ok(address) => address,
            Err(e) => {
                self.record_error(&e);
                return Err(e.into());
            }
        };
        info!(%address, "wallet connected");
        *self.lock_identity() = Some(address);

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "initial state load failed");
        }
        Ok(address)
    }

    /// Re-read the authoritative account state.
    ///
    /// Reads are safe at any time and do not contend with an in-flight
    /// mutation.
    pub async fn refresh(&self) -> Result<u32, ClientError> {
        self.lock_state().last_error = None;

        let count = match self.fetch_count().await {
            Ok(count) => count,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };
        self.lock_state().count = Some(count);
        self.refresh_slot().await;
        Ok(count)
    }

    /// Submit one increment/decrement and reconcile state afterwards.
    ///
    /// The flow runs strictly through: build, sign, submit, confirm,
    /// re-fetch. A failure before submission leaves the chain untouched; a
    /// failure after submission keeps the transaction signature visible,
    /// since the transaction may still land. Nothing is retried — with
    /// non-idempotent deltas, a blind retry risks double application.
    pub async fn mutate(&self, operation: Operation, operand: u32) -> Result<u32, ClientError> {
        let Some(fee_payer) = self.identity() else {
            let err = ClientError::NotConnected;
            self.record_error(&err);
            return Err(err);
        };

        // Reject rather than queue: one mutation in flight per session.
        let Ok(_flight) = self.flight.try_lock() else {
            return Err(ClientError::Busy);
        };

        if operand == 0 {
            let err = ClientError::ZeroOperand;
            self.record_error(&err);
            return Err(err);
        }

        self.lock_state().last_error = None;

        let result = self.run_mutation(fee_payer, operation, operand).await;

        let mut state = self.lock_state();
        state.phase = Phase::Idle;
        if let Err(e) = &result {
            state.last_error = Some(e.to_string());
        }
        drop(state);

        result
    }

    async fn run_mutation(
        &self,
        fee_payer: Address,
        operation: Operation,
        operand: u32,
    ) -> Result<u32, ClientError> {
        self.set_phase(Phase::Building);
        debug!(?operation, operand, "building transaction");
        let blockhash = self.chain.fetch_recent_blockhash().await?;
        let instruction = build_counter_instruction(
            self.config.program_address,
            self.config.storage_address,
            operation,
            operand,
        );
        let tx = compile_transaction(&[instruction], fee_payer, blockhash)?;

        self.set_phase(Phase::AwaitingSignature);
        let signed = self.wallet.sign(&tx).await?;

        self.set_phase(Phase::Submitting);
        let signature = self.chain.submit(&signed).await?;
        // Recorded before confirmation, so even a transaction that later
        // times out or fails stays inspectable.
        {
            let mut state = self.lock_state();
            state.last_signature = Some(signature.clone());
        }
        info!(%signature, "transaction submitted");

        self.set_phase(Phase::AwaitingConfirmation);
        self.chain.await_confirmation(&signature).await?;

        self.set_phase(Phase::Refreshing);
        let count = self.fetch_count().await?;
        {
            let mut state = self.lock_state();
            state.count = Some(count);
            state.recent_signatures.insert(0, signature);
            state.recent_signatures.truncate(RECENT_SIGNATURE_LIMIT);
        }
        self.refresh_slot().await;

        info!(count, "state synchronized");
        Ok(count)
    }

    async fn fetch_count(&self) -> Result<u32, ClientError> {
        let raw = self.chain.fetch_account(&self.config.storage_address).await?;
        let record = decode_record(&raw)?;
        Ok(record.count)
    }

    /// Best effort: a failed slot lookup never fails the surrounding flow.
    async fn refresh_slot(&self) {
        match self.chain.fetch_slot().await {
            Ok(slot) => self.lock_state().last_slot = Some(slot),
            Err(e) => warn!(error = %e, "slot refresh failed"),
        }
    }

    fn set_phase(&self, phase: Phase) {
        debug!(?phase, "mutation phase");
        self.lock_state().phase = phase;
    }

    fn record_error(&self, error: &dyn std::fmt::Display) {
        self.lock_state().last_error = Some(error.to_string());
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_identity(&self) -> MutexGuard<'_, Option<Address>> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
