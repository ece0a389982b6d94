//! Wire-level building blocks for the on-chain counter client.
//!
//! This crate covers the counter program's five-byte instruction encoding,
//! the fixed-layout account state codec, and the chain's compact binary
//! transaction format — all without pulling in `solana-sdk` (which drags in
//! tokio and 200+ transitive dependencies).
//!
//! Instead we implement the wire format by hand, using `ed25519-dalek` for
//! Ed25519 signing and `bs58` for Base58 encoding. Everything here is pure:
//! no networking, no I/O.

pub mod account;
pub mod address;
pub mod error;
pub mod instruction;
pub mod system;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use account::{decode_record, encode_record, CounterRecord, ACCOUNT_SPAN, RECORD_LEN};
pub use address::Address;
pub use error::WireError;
pub use instruction::{
    build_counter_instruction, decode_instruction, encode_instruction, Operation, INSTRUCTION_LEN,
};
pub use system::{build_create_account, SYSTEM_PROGRAM_ID};
pub use transaction::{
    compile_transaction, decode_compact_u16, encode_compact_u16, serialize_message,
    sign_transaction, AccountMeta, Blockhash, CompiledInstruction, Instruction, Transaction,
};
