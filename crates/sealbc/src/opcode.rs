use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytecode instructions for the Seal VM.
///
/// Register-addressed: every instruction names its destination slot and its
/// source slots explicitly. Operands follow the opcode byte in the order
/// listed on each variant. `r` operands use the variable-width register
/// encoding, `k` operands are 32-bit big-endian constant pool indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// No operation.
    Nop = 0x00,
    /// `dest(r), value(1)`: load a signed 8-bit immediate.
    Ldi8 = 0x01,
    /// `dest(r), source(k)`: load a constant pool entry.
    Ldk = 0x02,
    /// `dest(r), source(r)`
    Cpy = 0x03,

    // Arithmetic: dest(r), lhs(r), rhs(r)
    Add = 0x04,
    Sub = 0x05,
    Mul = 0x06,
    Div = 0x07,
    Mod = 0x08,
    Pow = 0x09,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Opcode::Nop),
            0x01 => Some(Opcode::Ldi8),
            0x02 => Some(Opcode::Ldk),
            0x03 => Some(Opcode::Cpy),
            0x04 => Some(Opcode::Add),
            0x05 => Some(Opcode::Sub),
            0x06 => Some(Opcode::Mul),
            0x07 => Some(Opcode::Div),
            0x08 => Some(Opcode::Mod),
            0x09 => Some(Opcode::Pow),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// True for the three-register arithmetic instructions.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod | Opcode::Pow
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Ldi8 => "ldi8",
            Opcode::Ldk => "ldk",
            Opcode::Cpy => "cpy",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::Pow => "pow",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
