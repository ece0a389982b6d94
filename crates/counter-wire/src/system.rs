//! System-program instruction builder used when provisioning the counter
//! storage account.

use crate::address::Address;
use crate::transaction::{AccountMeta, Instruction};

/// The system program: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Address = Address::new([0u8; 32]);

/// System program `CreateAccount` instruction index (little-endian u32).
const CREATE_ACCOUNT_IX_INDEX: u32 = 0;

/// Build a `CreateAccount` instruction that allocates `space` bytes at
/// `new_account`, funds it with `lamports`, and assigns ownership to
/// `owner`.
///
/// Both the funder and the new account must sign the enclosing transaction.
pub fn build_create_account(
    funder: Address,
    new_account: Address,
    lamports: u64,
    space: u64,
    owner: Address,
) -> Instruction {
    // Instruction data: u32 LE index (0 = CreateAccount) + u64 LE lamports
    // + u64 LE space + 32-byte owner key.
    let mut data = Vec::with_capacity(4 + 8 + 8 + 32);
    data.extend_from_slice(&CREATE_ACCOUNT_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_bytes());

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta {
                address: funder,
                is_signer: true,
                is_writable: true,
            },
            AccountMeta {
                address: new_account,
                is_signer: true,
                is_writable: true,
            },
        ],
        data,
    }
}
