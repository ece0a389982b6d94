//! Client for a minimal on-chain counter program.
//!
//! The embedding application connects a signing capability, reads the
//! counter value held in a single storage account, and submits
//! increment/decrement transactions. [`CounterSession`] drives the whole
//! flow — encode, sign, submit, confirm, re-fetch — and exposes the
//! eventually-consistent [`SyncState`] a presentation layer renders.
//!
//! Network access goes through the [`ChainClient`] trait ([`RpcClient`] is
//! the JSON-RPC implementation) and signing goes through the [`Wallet`]
//! trait, so both can be substituted in tests or embedded environments.

pub mod chain;
pub mod config;
pub mod error;
pub mod provision;
pub mod rpc;
pub mod session;
pub mod wallet;

pub use chain::{ChainClient, ChainError};
pub use config::ClientConfig;
pub use error::ClientError;
pub use provision::{create_counter_account, fund_with_airdrop, LAMPORTS_PER_SOL};
pub use rpc::RpcClient;
pub use session::{CounterSession, Phase, SyncState, RECENT_SIGNATURE_LIMIT};
pub use wallet::{KeypairWallet, UnavailableWallet, Wallet, WalletError};
