use thiserror::Error;

/// Wire-level encoding, decoding, and signing errors.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid instruction data: {0}")]
    InvalidInstruction(String),

    #[error("account data too short: expected at least {expected} bytes, got {actual}")]
    RecordTooShort { expected: usize, actual: usize },

    #[error("transaction build error: {0}")]
    TransactionBuild(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = WireError::InvalidAddress("bad decode".into());
        assert_eq!(err.to_string(), "invalid address: bad decode");
    }

    #[test]
    fn display_record_too_short() {
        let err = WireError::RecordTooShort {
            expected: 4,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "account data too short: expected at least 4 bytes, got 2"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(WireError::Signing("no key for signer".into()));
        assert!(err.to_string().contains("no key for signer"));
    }
}
