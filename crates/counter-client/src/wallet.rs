//! Transaction-signing capability.
//!
//! The embedding application injects a [`Wallet`] implementation instead of
//! probing the environment for one at call sites. [`KeypairWallet`] is the
//! always-available in-process signer; [`UnavailableWallet`] stands in for
//! an environment with no signing capability at all, so "no wallet" takes
//! the same code path as every other wallet outcome.

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use thiserror::Error;
use zeroize::Zeroize;

use counter_wire::{sign_transaction, Address, Transaction, WireError};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("no wallet available")]
    Unavailable,

    #[error("wallet request rejected: {0}")]
    Rejected(String),

    #[error("wallet disconnected")]
    Disconnected,

    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<WireError> for WalletError {
    fn from(e: WireError) -> Self {
        WalletError::Signing(e.to_string())
    }
}

/// A transaction-signing capability.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Whether a signing capability is present at all. Never fails.
    fn is_available(&self) -> bool;

    /// Request authorization and return the signing identity — the address
    /// used as fee payer.
    async fn connect(&self) -> Result<Address, WalletError>;

    /// Sign the transaction, returning wire bytes ready for submission.
    ///
    /// Implementations that front an interactive signer report a user
    /// decline as [`WalletError::Rejected`], and a capability revoked since
    /// `connect` as [`WalletError::Disconnected`].
    async fn sign(&self, tx: &Transaction) -> Result<Vec<u8>, WalletError>;
}

/// In-process signer holding an Ed25519 seed: the headless counterpart of a
/// browser-injected wallet. `connect` always succeeds and `sign` never
/// prompts.
pub struct KeypairWallet {
    seed: [u8; 32],
    address: Address,
}

impl KeypairWallet {
    pub fn new(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let address = Address::new(signing_key.verifying_key().to_bytes());
        Self { seed, address }
    }

    /// The address this wallet signs as.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl Drop for KeypairWallet {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

#[async_trait]
impl Wallet for KeypairWallet {
    fn is_available(&self) -> bool {
        true
    }

    async fn connect(&self) -> Result<Address, WalletError> {
        Ok(self.address)
    }

    async fn sign(&self, tx: &Transaction) -> Result<Vec<u8>, WalletError> {
        Ok(sign_transaction(tx, &[self.seed])?)
    }
}

/// The absent capability: `connect` and `sign` always fail with
/// [`WalletError::Unavailable`].
pub struct UnavailableWallet;

#[async_trait]
impl Wallet for UnavailableWallet {
    fn is_available(&self) -> bool {
        false
    }

    async fn connect(&self) -> Result<Address, WalletError> {
        Err(WalletError::Unavailable)
    }

    async fn sign(&self, _tx: &Transaction) -> Result<Vec<u8>, WalletError> {
        Err(WalletError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counter_wire::{build_counter_instruction, compile_transaction, Operation};

    fn sample_tx(fee_payer: Address) -> Transaction {
        let ix = build_counter_instruction(
            Address::new([7u8; 32]),
            Address::new([9u8; 32]),
            Operation::Increment,
            1,
        );
        compile_transaction(&[ix], fee_payer, [0u8; 32]).unwrap()
    }

    #[tokio::test]
    async fn keypair_wallet_connects_as_its_address() {
        let wallet = KeypairWallet::new([0x42u8; 32]);
        let connected = wallet.connect().await.unwrap();
        assert_eq!(connected, wallet.address());
        assert!(wallet.is_available());
    }

    #[tokio::test]
    async fn keypair_wallet_signature_verifies() {
        use ed25519_dalek::{Signature, VerifyingKey};

        let wallet = KeypairWallet::new([0x42u8; 32]);
        let tx = sample_tx(wallet.address());
        let wire = wallet.sign(&tx).await.unwrap();

        let sig_bytes: [u8; 64] = wire[1..65].try_into().unwrap();
        let signature = Signature::from_bytes(&sig_bytes);
        let vk = VerifyingKey::from_bytes(wallet.address().as_bytes()).unwrap();
        assert!(vk.verify_strict(&wire[65..], &signature).is_ok());
    }

    #[tokio::test]
    async fn keypair_wallet_rejects_foreign_fee_payer() {
        let wallet = KeypairWallet::new([0x42u8; 32]);
        let tx = sample_tx(Address::new([0x99u8; 32]));
        let result = wallet.sign(&tx).await;
        assert!(matches!(result, Err(WalletError::Signing(_))));
    }

    #[tokio::test]
    async fn unavailable_wallet_fails_everything() {
        let wallet = UnavailableWallet;
        assert!(!wallet.is_available());
        assert!(matches!(
            wallet.connect().await,
            Err(WalletError::Unavailable)
        ));
        let tx = sample_tx(Address::new([1u8; 32]));
        assert!(matches!(
            wallet.sign(&tx).await,
            Err(WalletError::Unavailable)
        ));
    }
}
