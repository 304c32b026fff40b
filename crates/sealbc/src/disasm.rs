//! Instruction decoding and human-readable listings.

use std::fmt::{self, Write};

use crate::encode::{decode_register, decode_u32};
use crate::module::{BytecodeError, Chunk};
use crate::opcode::Opcode;

/// A decoded instruction with its operands widened to `u32` registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Ldi8 { dest: u32, value: i8 },
    Ldk { dest: u32, index: u32 },
    Cpy { dest: u32, src: u32 },
    Binary { op: Opcode, dest: u32, lhs: u32, rhs: u32 },
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Nop => Opcode::Nop,
            Instruction::Ldi8 { .. } => Opcode::Ldi8,
            Instruction::Ldk { .. } => Opcode::Ldk,
            Instruction::Cpy { .. } => Opcode::Cpy,
            Instruction::Binary { op, .. } => *op,
        }
    }

    /// Destination register, if the instruction writes one.
    pub fn dest(&self) -> Option<u32> {
        match self {
            Instruction::Nop => None,
            Instruction::Ldi8 { dest, .. }
            | Instruction::Ldk { dest, .. }
            | Instruction::Cpy { dest, .. }
            | Instruction::Binary { dest, .. } => Some(*dest),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Nop => write!(f, "nop"),
            Instruction::Ldi8 { dest, value } => write!(f, "ldi8 r{dest}, {value}"),
            Instruction::Ldk { dest, index } => write!(f, "ldk r{dest}, k{index}"),
            Instruction::Cpy { dest, src } => write!(f, "cpy r{dest}, r{src}"),
            Instruction::Binary { op, dest, lhs, rhs } => {
                write!(f, "{op} r{dest}, r{lhs}, r{rhs}")
            }
        }
    }
}

/// Cursor over an instruction stream.
struct Reader<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn register(&mut self) -> Result<u32, BytecodeError> {
        let (reg, width) = decode_register(&self.code[self.pos..])?;
        self.pos += width;
        Ok(reg)
    }

    fn byte(&mut self) -> Result<u8, BytecodeError> {
        let byte = *self.code.get(self.pos).ok_or(BytecodeError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    fn word(&mut self) -> Result<u32, BytecodeError> {
        let value = decode_u32(&self.code[self.pos..])?;
        self.pos += 4;
        Ok(value)
    }

    fn instruction(&mut self) -> Result<Instruction, BytecodeError> {
        let offset = self.pos;
        let byte = self.byte()?;
        let op = Opcode::from_byte(byte).ok_or(BytecodeError::UnknownOpcode { byte, offset })?;
        let instr = match op {
            Opcode::Nop => Instruction::Nop,
            Opcode::Ldi8 => {
                let dest = self.register()?;
                let value = self.byte()? as i8;
                Instruction::Ldi8 { dest, value }
            }
            Opcode::Ldk => {
                let dest = self.register()?;
                let index = self.word()?;
                Instruction::Ldk { dest, index }
            }
            Opcode::Cpy => {
                let dest = self.register()?;
                let src = self.register()?;
                Instruction::Cpy { dest, src }
            }
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod | Opcode::Pow => {
                let dest = self.register()?;
                let lhs = self.register()?;
                let rhs = self.register()?;
                Instruction::Binary { op, dest, lhs, rhs }
            }
        };
        Ok(instr)
    }
}

/// Decode a whole instruction stream into `(offset, instruction)` pairs.
pub fn decode(code: &[u8]) -> Result<Vec<(usize, Instruction)>, BytecodeError> {
    let mut reader = Reader { code, pos: 0 };
    let mut out = Vec::new();
    while reader.pos < code.len() {
        let offset = reader.pos;
        out.push((offset, reader.instruction()?));
    }
    Ok(out)
}

/// Render a chunk as an assembly listing, one instruction per line, with
/// constant pool values annotated on `ldk` lines.
pub fn listing(chunk: &Chunk) -> Result<String, BytecodeError> {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "; {} bytes, {} constants, frame size {}",
        chunk.code.len(),
        chunk.constants.len(),
        chunk.frame_size
    );
    for (offset, instr) in decode(&chunk.code)? {
        match instr {
            Instruction::Ldk { index, .. } => {
                let value = chunk.constant(index)?;
                let _ = writeln!(out, "{offset:04}  {:<20} ; {value}", instr.to_string());
            }
            _ => {
                let _ = writeln!(out, "{offset:04}  {instr}");
            }
        }
    }
    Ok(out)
}
