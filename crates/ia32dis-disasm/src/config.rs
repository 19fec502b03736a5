//! Decoder configuration.

/// What to do when an instruction needs bytes beyond the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TruncationPolicy {
    /// Missing bytes read as zero and decoding continues.
    #[default]
    ZeroFill,
    /// Reading past the end aborts the stream with `DecodeError::Truncated`.
    Error,
}

/// Configuration for a decode run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// Program counter of the first byte of the buffer.
    pub start_pc: u64,
    /// Behaviour on reads past the end of the buffer.
    pub truncation: TruncationPolicy,
    /// Stop after this many instructions have been visited.
    pub max_instructions: Option<usize>,
}

impl DecoderConfig {
    /// Creates the default configuration: PC 0, zero-fill, no limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that rejects truncated instructions.
    pub fn strict() -> Self {
        Self::default().with_truncation(TruncationPolicy::Error)
    }

    /// Sets the program counter of the first byte.
    pub fn with_start_pc(mut self, pc: u64) -> Self {
        self.start_pc = pc;
        self
    }

    /// Sets the truncation policy.
    pub fn with_truncation(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = policy;
        self
    }

    /// Limits the number of instructions visited.
    pub fn with_max_instructions(mut self, max: usize) -> Self {
        self.max_instructions = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.start_pc, 0);
        assert_eq!(config.truncation, TruncationPolicy::ZeroFill);
        assert_eq!(config.max_instructions, None);
        assert_eq!(DecoderConfig::strict().truncation, TruncationPolicy::Error);
    }

    #[test]
    fn test_builders() {
        let config = DecoderConfig::new()
            .with_start_pc(0x8048000)
            .with_max_instructions(16)
            .with_truncation(TruncationPolicy::Error);
        assert_eq!(config.start_pc, 0x8048000);
        assert_eq!(config.max_instructions, Some(16));
        assert_eq!(config.truncation, TruncationPolicy::Error);
    }
}
