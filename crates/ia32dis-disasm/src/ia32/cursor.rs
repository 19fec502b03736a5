//! Byte cursor over the input buffer.

use crate::config::TruncationPolicy;
use crate::DecodeError;

/// Little-endian reader over the code buffer.
///
/// Under `TruncationPolicy::ZeroFill` reads past the end yield zero bytes and
/// still advance the position, so the position may end up beyond the buffer.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: u64,
    policy: TruncationPolicy,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8], base: u64, policy: TruncationPolicy) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
            policy,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Address of the byte at `offset`.
    pub fn address_of(&self, offset: usize) -> u64 {
        self.base.wrapping_add(offset as u64)
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    pub fn peek(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        let available = self.bytes.len().saturating_sub(self.pos);
        if available < N && self.policy == TruncationPolicy::Error {
            return Err(DecodeError::truncated(
                self.address_of(self.pos),
                N,
                available,
            ));
        }
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.byte_at(self.pos + i).unwrap_or(0);
        }
        self.advance(N);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32()? as i32)
    }
}
