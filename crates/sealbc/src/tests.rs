#[cfg(test)]
mod tests {
    use crate::disasm::{self, Instruction};
    use crate::encode::*;
    use crate::*;

    #[test]
    fn test_short_register_is_one_byte() {
        let enc = encode_register(0).unwrap();
        assert_eq!(enc.as_bytes(), &[0x00]);
        let enc = encode_register(127).unwrap();
        assert_eq!(enc.as_bytes(), &[0x7F]);
    }

    #[test]
    fn test_long_register_layout() {
        assert_eq!(encode_register(128).unwrap().as_bytes(), &[0x80, 0x00]);
        assert_eq!(encode_register(129).unwrap().as_bytes(), &[0x80, 0x01]);
        assert_eq!(encode_register(128 + 0x1234).unwrap().as_bytes(), &[0x92, 0x34]);
        assert_eq!(encode_register(MAX_REGISTERS - 1).unwrap().as_bytes(), &[0xFF, 0xFE]);
    }

    #[test]
    fn test_register_roundtrip_full_range() {
        for reg in 0..MAX_REGISTERS {
            let enc = encode_register(reg).unwrap();
            let (decoded, width) = decode_register(enc.as_bytes()).unwrap();
            assert_eq!(decoded, reg);
            assert_eq!(width, enc.len());
        }
    }

    #[test]
    fn test_register_out_of_range() {
        assert_eq!(MAX_REGISTERS, 32895);
        assert!(matches!(
            encode_register(32895),
            Err(BytecodeError::RegisterOutOfRange(32895))
        ));
        assert!(encode_register(u32::MAX).is_err());
    }

    #[test]
    fn test_decode_truncated_register() {
        assert!(matches!(decode_register(&[]), Err(BytecodeError::Truncated)));
        assert!(matches!(decode_register(&[0x81]), Err(BytecodeError::Truncated)));
    }

    #[test]
    fn test_u32_is_big_endian() {
        assert_eq!(encode_u32(0x0102_0304), [1, 2, 3, 4]);
        assert_eq!(decode_u32(&[0, 0, 1, 0]).unwrap(), 256);
        assert!(decode_u32(&[0, 0, 1]).is_err());
    }

    #[test]
    fn test_opcode_bytes() {
        for byte in 0..=9u8 {
            let op = Opcode::from_byte(byte).unwrap();
            assert_eq!(op.to_byte(), byte);
        }
        assert_eq!(Opcode::from_byte(10), None);
        assert!(Opcode::Pow.is_binary());
        assert!(!Opcode::Cpy.is_binary());
    }

    #[test]
    fn test_decode_instructions() {
        let code = vec![
            0x01, 0x00, 0xF6, // ldi8 r0, -10
            0x02, 0x80, 0x02, 0, 0, 0, 3, // ldk r130, k3
            0x03, 0x01, 0x00, // cpy r1, r0
            0x04, 0x02, 0x00, 0x01, // add r2, r0, r1
            0x00, // nop
        ];
        let decoded = disasm::decode(&code).unwrap();
        let instrs: Vec<_> = decoded.iter().map(|(_, i)| *i).collect();
        assert_eq!(
            instrs,
            vec![
                Instruction::Ldi8 { dest: 0, value: -10 },
                Instruction::Ldk { dest: 130, index: 3 },
                Instruction::Cpy { dest: 1, src: 0 },
                Instruction::Binary { op: Opcode::Add, dest: 2, lhs: 0, rhs: 1 },
                Instruction::Nop,
            ]
        );
        let offsets: Vec<_> = decoded.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0, 3, 10, 13, 17]);
        let dests: Vec<_> = instrs.iter().map(Instruction::dest).collect();
        assert_eq!(dests, vec![Some(0), Some(130), Some(1), Some(2), None]);
    }

    #[test]
    fn test_decode_unknown_opcode() {
        let err = disasm::decode(&[0x00, 0x42]).unwrap_err();
        assert!(matches!(err, BytecodeError::UnknownOpcode { byte: 0x42, offset: 1 }));
    }

    #[test]
    fn test_decode_truncated_instruction() {
        assert!(matches!(disasm::decode(&[0x02, 0x00, 0x00]), Err(BytecodeError::Truncated)));
    }

    #[test]
    fn test_instruction_display() {
        let instr = Instruction::Binary { op: Opcode::Mul, dest: 0, lhs: 1, rhs: 2 };
        assert_eq!(instr.to_string(), "mul r0, r1, r2");
        assert_eq!(Instruction::Ldk { dest: 4, index: 0 }.to_string(), "ldk r4, k0");
    }

    #[test]
    fn test_listing_annotates_constants() {
        let chunk = Chunk {
            code: vec![0x02, 0x00, 0, 0, 0, 0],
            constants: vec![Value::Int(1000)],
            frame_size: 1,
        };
        let text = disasm::listing(&chunk).unwrap();
        assert!(text.contains("ldk r0, k0"));
        assert!(text.contains("; 1000"));
    }

    #[test]
    fn test_listing_rejects_missing_constant() {
        let chunk = Chunk {
            code: vec![0x02, 0x00, 0, 0, 0, 7],
            constants: vec![],
            frame_size: 1,
        };
        assert!(matches!(disasm::listing(&chunk), Err(BytecodeError::InvalidConstant(7))));
    }

    #[test]
    fn test_chunk_json_roundtrip() {
        let chunk = Chunk {
            code: vec![0x01, 0x00, 0x0A],
            constants: vec![Value::Int(-500)],
            frame_size: 1,
        };
        let json = chunk.to_json().unwrap();
        let restored = Chunk::from_json(&json).unwrap();
        assert_eq!(chunk, restored);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(Value::Int(0).type_name(), "Int");
    }
}
