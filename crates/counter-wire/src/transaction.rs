//! Transaction wire format and signing.
//!
//! Transactions are built entirely by hand — no `solana-sdk` dependency.
//! The wire format is a compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use ed25519_dalek::Signer;
use zeroize::Zeroize;

use crate::address::Address;
use crate::error::WireError;

/// A recent blockhash, bounding the transaction's validity window.
pub type Blockhash = [u8; 32];

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in the chain's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(3);
    let mut rest = u32::from(value);
    loop {
        let byte = (rest & 0x7f) as u8;
        rest >>= 7;
        if rest == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)`, or an error if the data is truncated
/// or the encoding overflows a u16.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), WireError> {
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate().take(3) {
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            if value > u32::from(u16::MAX) {
                return Err(WireError::Serialization("compact-u16 value overflow".into()));
            }
            return Ok((value as u16, i + 1));
        }
    }
    Err(WireError::Serialization(
        "unexpected end of data while decoding compact-u16".into(),
    ))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// An instruction, before it is compiled into a transaction.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// A complete unsigned transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Address>,

    /// Number of required signatures (the first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    /// Recent blockhash stamped into the message.
    pub recent_blockhash: Blockhash,

    /// Compiled instructions (account references replaced with indices).
    pub instructions: Vec<CompiledInstruction>,
}

/// An instruction whose account references have been replaced by u8 indices
/// into the transaction's `account_keys` array.
#[derive(Debug, Clone)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

/// Build a transaction from a set of instructions with a single fee payer.
///
/// The fee payer is always a writable signer and lands at index 0 in the
/// account keys.
pub fn compile_transaction(
    instructions: &[Instruction],
    fee_payer: Address,
    recent_blockhash: Blockhash,
) -> Result<Transaction, WireError> {
    struct Entry {
        address: Address,
        is_signer: bool,
        is_writable: bool,
    }

    // Collect unique accounts with their permission bits merged. Instruction
    // account lists are tiny, so a Vec scan beats pulling in a map.
    let mut entries: Vec<Entry> = Vec::new();
    let mut upsert = |address: Address, is_signer: bool, is_writable: bool| {
        match entries.iter_mut().find(|e| e.address == address) {
            Some(entry) => {
                entry.is_signer |= is_signer;
                entry.is_writable |= is_writable;
            }
            None => entries.push(Entry {
                address,
                is_signer,
                is_writable,
            }),
        }
    };

    upsert(fee_payer, true, true);
    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.address, meta.is_signer, meta.is_writable);
        }
        // Program ids are non-signer, read-only accounts.
        upsert(ix.program_id, false, false);
    }

    // Canonical ordering. The sort is stable, and the fee payer was inserted
    // first, so it stays at the front of the writable-signer group.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<Address> = entries.iter().map(|e| e.address).collect();

    // Replace account references with indices.
    let index_of = |address: Address, what: &str| -> Result<u8, WireError> {
        account_keys
            .iter()
            .position(|k| *k == address)
            .map(|i| i as u8)
            .ok_or_else(|| WireError::TransactionBuild(format!("{what} not in account keys")))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(ix.program_id, "program id")?;
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(meta.address, "account"))
            .collect::<Result<Vec<u8>, _>>()?;

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(Transaction {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash,
        instructions: compiled,
    })
}

/// Serialize the transaction message (the bytes that get signed).
pub fn serialize_message(tx: &Transaction) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    // Header: 3 bytes.
    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    // Account keys.
    buf.extend_from_slice(&encode_compact_u16(tx.account_keys.len() as u16));
    for key in &tx.account_keys {
        buf.extend_from_slice(key.as_bytes());
    }

    // Recent blockhash.
    buf.extend_from_slice(&tx.recent_blockhash);

    // Instructions.
    buf.extend_from_slice(&encode_compact_u16(tx.instructions.len() as u16));
    for ix in &tx.instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&encode_compact_u16(ix.account_indices.len() as u16));
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
        buf.extend_from_slice(&ix.data);
    }

    buf
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Sign a transaction and serialize it into its wire format.
///
/// `seeds` holds the 32-byte Ed25519 seeds of the signing keys, in any
/// order; each required signer in `account_keys` must be covered by one of
/// them. The resulting byte vector is ready for submission.
pub fn sign_transaction(tx: &Transaction, seeds: &[[u8; 32]]) -> Result<Vec<u8>, WireError> {
    let num_signers = tx.num_required_signatures as usize;
    if num_signers == 0 {
        return Err(WireError::TransactionBuild(
            "transaction requires zero signatures".into(),
        ));
    }
    if num_signers > tx.account_keys.len() {
        return Err(WireError::TransactionBuild(
            "signer count exceeds account keys".into(),
        ));
    }

    let keys: Vec<ed25519_dalek::SigningKey> = seeds
        .iter()
        .map(|seed| {
            let mut seed = *seed;
            let key = ed25519_dalek::SigningKey::from_bytes(&seed);
            seed.zeroize();
            key
        })
        .collect();

    let message = serialize_message(tx);

    let mut wire = Vec::with_capacity(1 + 64 * num_signers + message.len());
    wire.extend_from_slice(&encode_compact_u16(num_signers as u16));

    // Signature slots follow the order of the signing account keys.
    for signer in &tx.account_keys[..num_signers] {
        let key = keys
            .iter()
            .find(|k| k.verifying_key().to_bytes() == *signer.as_bytes())
            .ok_or_else(|| WireError::Signing(format!("no key available for signer {signer}")))?;
        wire.extend_from_slice(&key.sign(&message).to_bytes());
    }

    wire.extend_from_slice(&message);
    Ok(wire)
}
