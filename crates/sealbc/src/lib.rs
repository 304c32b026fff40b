pub mod disasm;
pub mod encode;
pub mod module;
pub mod opcode;
pub mod value;
#[cfg(test)]
mod tests;

pub use disasm::Instruction;
pub use encode::{decode_register, encode_register, MAX_REGISTERS};
pub use module::{BytecodeError, Chunk};
pub use opcode::Opcode;
pub use value::Value;
