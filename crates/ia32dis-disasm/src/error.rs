//! Disassembly error types.

use thiserror::Error;

/// Error type for instruction decoding.
///
/// Undefined opcodes are not errors: they decode to an illegal instruction
/// and the stream continues. These variants abort the stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A field extends past the end of the buffer (strict truncation only).
    #[error("truncated instruction at {address:#x}: need {needed} bytes, have {available}")]
    Truncated {
        address: u64,
        needed: usize,
        available: usize,
    },

    /// A table entry refers to something that does not exist.
    #[error("invalid decode table entry at {address:#x}: {reason}")]
    InvalidTable { address: u64, reason: String },

    /// The visitor asked the driver to stop.
    #[error("decoding stopped by visitor after instruction at {address:#x}")]
    Stopped { address: u64 },
}

impl DecodeError {
    /// Creates a new Truncated error.
    pub fn truncated(address: u64, needed: usize, available: usize) -> Self {
        Self::Truncated {
            address,
            needed,
            available,
        }
    }

    /// Creates a new InvalidTable error.
    pub fn invalid_table(address: u64, reason: impl Into<String>) -> Self {
        Self::InvalidTable {
            address,
            reason: reason.into(),
        }
    }

    /// Creates a new Stopped error.
    pub fn stopped(address: u64) -> Self {
        Self::Stopped { address }
    }

    /// Returns true if decoding ended because the visitor asked it to.
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stopped { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            DecodeError::truncated(0x1000, 4, 2).to_string(),
            "truncated instruction at 0x1000: need 4 bytes, have 2"
        );
        assert_eq!(
            DecodeError::invalid_table(0x10, "group 99 does not exist").to_string(),
            "invalid decode table entry at 0x10: group 99 does not exist"
        );
        assert!(DecodeError::stopped(0).is_stop());
    }
}
