//! One-time setup of the counter storage account.
//!
//! The storage account is created out-of-band, before any session traffic:
//! fund a payer, allocate the fixed-span account owned by the counter
//! program, confirm. This is what an operator would otherwise script by
//! hand against a test network.

use ed25519_dalek::SigningKey;
use tracing::info;
use zeroize::Zeroize;

use counter_wire::{
    build_create_account, compile_transaction, sign_transaction, Address, ACCOUNT_SPAN,
};

use crate::chain::ChainClient;
use crate::error::ClientError;

/// Lamports per whole native token.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Faucet-fund `address` and wait for the airdrop to finalize.
pub async fn fund_with_airdrop<C: ChainClient>(
    chain: &C,
    address: Address,
    lamports: u64,
) -> Result<String, ClientError> {
    let signature = chain.request_airdrop(&address, lamports).await?;
    chain.await_confirmation(&signature).await?;
    info!(%address, lamports, "airdrop finalized");
    Ok(signature)
}

/// Create the counter storage account owned by `program`.
///
/// The account gets the fixed storage span and the rent-exempt minimum for
/// it. Both the payer and the new account sign the creation transaction;
/// the payer covers fees and funding. Returns the creation signature.
pub async fn create_counter_account<C: ChainClient>(
    chain: &C,
    payer_seed: [u8; 32],
    account_seed: [u8; 32],
    program: Address,
) -> Result<String, ClientError> {
    let payer = address_of(&payer_seed);
    let new_account = address_of(&account_seed);

    let lamports = chain
        .minimum_balance_for_rent_exemption(ACCOUNT_SPAN as u64)
        .await?;
    let blockhash = chain.fetch_recent_blockhash().await?;

    let instruction =
        build_create_account(payer, new_account, lamports, ACCOUNT_SPAN as u64, program);
    let tx = compile_transaction(&[instruction], payer, blockhash)?;
    let signed = sign_transaction(&tx, &[payer_seed, account_seed])?;

    let signature = chain.submit(&signed).await?;
    chain.await_confirmation(&signature).await?;
    info!(%new_account, %signature, "counter storage account created");
    Ok(signature)
}

fn address_of(seed: &[u8; 32]) -> Address {
    let mut seed = *seed;
    let key = SigningKey::from_bytes(&seed);
    seed.zeroize();
    Address::new(key.verifying_key().to_bytes())
}
