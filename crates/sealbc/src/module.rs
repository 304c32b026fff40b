use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Error)]
pub enum BytecodeError {
    #[error("register r{0} exceeds the addressable range")]
    RegisterOutOfRange(u32),
    #[error("unknown opcode 0x{byte:02x} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },
    #[error("truncated instruction operand")]
    Truncated,
    #[error("constant index {0} out of range")]
    InvalidConstant(u32),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Output of code generation: a flat instruction stream and the constant
/// pool it indexes into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub code: Vec<u8>,
    pub constants: Vec<Value>,
    /// Number of register slots the chunk addresses at its peak.
    pub frame_size: u32,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON (portable text format).
    pub fn to_json(&self) -> Result<String, BytecodeError> {
        serde_json::to_string_pretty(self).map_err(|e| BytecodeError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, BytecodeError> {
        serde_json::from_str(json).map_err(|e| BytecodeError::Serialization(e.to_string()))
    }

    /// Look up a constant pool entry.
    pub fn constant(&self, index: u32) -> Result<&Value, BytecodeError> {
        self.constants
            .get(index as usize)
            .ok_or(BytecodeError::InvalidConstant(index))
    }
}
