//! The counter program's instruction encoding.
//!
//! Every mutation is a fixed five-byte payload:
//!
//! ```text
//! offset 0      operation tag: 0 = Increment, 1 = Decrement
//! offset 1..5   operand, u32 little-endian
//! ```
//!
//! The program applies the operand as a delta against the stored count. The
//! wire format permits an operand of zero; rejecting pointless zero deltas
//! is left to callers.

use crate::address::Address;
use crate::error::WireError;
use crate::transaction::{AccountMeta, Instruction};

/// Serialized instruction length: one tag byte plus a u32 operand.
pub const INSTRUCTION_LEN: usize = 5;

/// The two mutations the counter program accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Increment,
    Decrement,
}

impl Operation {
    /// Wire tag for this operation.
    pub const fn tag(self) -> u8 {
        match self {
            Operation::Increment => 0,
            Operation::Decrement => 1,
        }
    }

    /// Inverse of [`Operation::tag`].
    pub fn from_tag(tag: u8) -> Result<Self, WireError> {
        match tag {
            0 => Ok(Operation::Increment),
            1 => Ok(Operation::Decrement),
            other => Err(WireError::InvalidInstruction(format!(
                "unknown operation tag {other}"
            ))),
        }
    }
}

/// Encode an operation and its operand into the five-byte payload.
///
/// Pure and deterministic; the full u32 operand range is representable.
pub fn encode_instruction(operation: Operation, operand: u32) -> [u8; INSTRUCTION_LEN] {
    let mut data = [0u8; INSTRUCTION_LEN];
    data[0] = operation.tag();
    data[1..].copy_from_slice(&operand.to_le_bytes());
    data
}

/// Decode a five-byte payload back into its operation and operand.
pub fn decode_instruction(data: &[u8]) -> Result<(Operation, u32), WireError> {
    if data.len() != INSTRUCTION_LEN {
        return Err(WireError::InvalidInstruction(format!(
            "expected {INSTRUCTION_LEN} bytes, got {}",
            data.len()
        )));
    }
    let operation = Operation::from_tag(data[0])?;
    let operand = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
    Ok((operation, operand))
}

/// Build the program instruction that applies `operation` by `operand`
/// against the counter storage account.
///
/// The storage account is writable but does not sign; only the program may
/// rewrite its contents.
pub fn build_counter_instruction(
    program_id: Address,
    storage: Address,
    operation: Operation,
    operand: u32,
) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![AccountMeta {
            address: storage,
            is_signer: false,
            is_writable: true,
        }],
        data: encode_instruction(operation, operand).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_layout() {
        assert_eq!(encode_instruction(Operation::Increment, 5), [0, 5, 0, 0, 0]);
    }

    #[test]
    fn decrement_layout() {
        assert_eq!(encode_instruction(Operation::Decrement, 2), [1, 2, 0, 0, 0]);
    }

    #[test]
    fn operand_is_little_endian() {
        let data = encode_instruction(Operation::Increment, 0x0102_0304);
        assert_eq!(data, [0, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn roundtrip_across_operand_range() {
        for operation in [Operation::Increment, Operation::Decrement] {
            for operand in [0u32, 1, 255, 256, 65_536, u32::MAX - 1, u32::MAX] {
                let data = encode_instruction(operation, operand);
                let (op, val) = decode_instruction(&data).unwrap();
                assert_eq!(op, operation);
                assert_eq!(val, operand);
            }
        }
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        let result = decode_instruction(&[2, 0, 0, 0, 0]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown operation tag"));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(decode_instruction(&[]).is_err());
        assert!(decode_instruction(&[0, 1, 0, 0]).is_err());
        assert!(decode_instruction(&[0, 1, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn counter_instruction_targets_storage_account() {
        let program = Address::new([7u8; 32]);
        let storage = Address::new([9u8; 32]);
        let ix = build_counter_instruction(program, storage, Operation::Increment, 3);

        assert_eq!(ix.program_id, program);
        assert_eq!(ix.accounts.len(), 1);
        assert_eq!(ix.accounts[0].address, storage);
        assert!(!ix.accounts[0].is_signer);
        assert!(ix.accounts[0].is_writable);
        assert_eq!(ix.data, vec![0, 3, 0, 0, 0]);
    }
}
