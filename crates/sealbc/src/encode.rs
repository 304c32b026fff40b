//! Operand encoding.
//!
//! Registers below [`SHORT_REGISTER_LIMIT`] take a single byte. Larger
//! registers take two bytes: the first has its high bit set, and its low
//! 7 bits together with the second byte hold `reg - 128` in big-endian order.

use crate::module::BytecodeError;

/// Registers below this value encode as a single byte.
pub const SHORT_REGISTER_LIMIT: u32 = 0x80;

/// First register that can no longer be addressed. The all-ones long form
/// (`0xFF 0xFF`) is left unused.
pub const MAX_REGISTERS: u32 = SHORT_REGISTER_LIMIT + 0x7FFF;

const LONG_FLAG: u8 = 0x80;

/// A register operand in its wire form, one or two bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedRegister {
    bytes: [u8; 2],
    len: u8,
}

impl EncodedRegister {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub fn encode_register(reg: u32) -> Result<EncodedRegister, BytecodeError> {
    if reg < SHORT_REGISTER_LIMIT {
        return Ok(EncodedRegister { bytes: [reg as u8, 0], len: 1 });
    }
    if reg >= MAX_REGISTERS {
        return Err(BytecodeError::RegisterOutOfRange(reg));
    }
    let offset = reg - SHORT_REGISTER_LIMIT;
    Ok(EncodedRegister {
        bytes: [LONG_FLAG | (offset >> 8) as u8, (offset & 0xFF) as u8],
        len: 2,
    })
}

/// Decode a register operand at the start of `code`.
/// Returns the register and the number of bytes consumed.
pub fn decode_register(code: &[u8]) -> Result<(u32, usize), BytecodeError> {
    let first = *code.first().ok_or(BytecodeError::Truncated)?;
    if first & LONG_FLAG == 0 {
        return Ok((first as u32, 1));
    }
    let second = *code.get(1).ok_or(BytecodeError::Truncated)?;
    let offset = (((first & !LONG_FLAG) as u32) << 8) | second as u32;
    Ok((offset + SHORT_REGISTER_LIMIT, 2))
}

pub fn encode_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

pub fn decode_u32(code: &[u8]) -> Result<u32, BytecodeError> {
    match code.get(..4) {
        Some(&[a, b, c, d]) => Ok(u32::from_be_bytes([a, b, c, d])),
        _ => Err(BytecodeError::Truncated),
    }
}
