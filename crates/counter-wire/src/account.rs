//! Fixed-layout codec for the counter's on-chain account state.
//!
//! ```text
//! offset 0..4   count, u32 little-endian
//! offset 4..8   reserved, present in allocated storage, ignored by decode
//! ```

use crate::error::WireError;

/// Width of the meaningful record prefix.
pub const RECORD_LEN: usize = 4;

/// Total bytes allocated for the storage account (record plus reserved tail).
pub const ACCOUNT_SPAN: usize = 8;

/// The counter state as observed on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRecord {
    pub count: u32,
}

/// Decode raw account storage into a counter record.
///
/// Only the first [`RECORD_LEN`] bytes are interpreted; anything past them
/// is allocation padding and never affects the result.
pub fn decode_record(raw: &[u8]) -> Result<CounterRecord, WireError> {
    if raw.len() < RECORD_LEN {
        return Err(WireError::RecordTooShort {
            expected: RECORD_LEN,
            actual: raw.len(),
        });
    }
    let count = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    Ok(CounterRecord { count })
}

/// Encode a record into a freshly-allocated account image.
///
/// The client never writes account bytes to the chain directly — mutation
/// goes through program instructions — so this is the inverse mapping used
/// for round-trip validation and test fixtures.
pub fn encode_record(record: CounterRecord) -> [u8; ACCOUNT_SPAN] {
    let mut raw = [0u8; ACCOUNT_SPAN];
    raw[..RECORD_LEN].copy_from_slice(&record.count.to_le_bytes());
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reads_little_endian_prefix() {
        let raw = [0x2a, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(decode_record(&raw).unwrap().count, 42);
    }

    #[test]
    fn trailing_bytes_never_affect_the_result() {
        let short = [5u8, 0, 0, 0];
        let padded = [5u8, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef, 0x01];
        assert_eq!(decode_record(&short).unwrap(), decode_record(&padded).unwrap());
    }

    #[test]
    fn decode_short_buffer_fails() {
        for len in 0..RECORD_LEN {
            let raw = vec![0u8; len];
            let err = decode_record(&raw).unwrap_err();
            assert!(matches!(err, WireError::RecordTooShort { actual, .. } if actual == len));
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        for count in [0u32, 1, 5, 1_000_000, u32::MAX] {
            let raw = encode_record(CounterRecord { count });
            assert_eq!(decode_record(&raw).unwrap().count, count);
        }
    }

    #[test]
    fn encode_zeroes_the_reserved_tail() {
        let raw = encode_record(CounterRecord { count: u32::MAX });
        assert_eq!(&raw[RECORD_LEN..], &[0u8; ACCOUNT_SPAN - RECORD_LEN]);
    }
}
