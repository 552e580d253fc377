use std::fmt;

/// A decoded instruction word.
///
/// Register operands (`x`, `y`) are always in `0x0..=0xF`, addresses (`nnn`)
/// in `0x000..=0xFFF` and sprite heights (`n`) in `0x0..=0xF`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1NNN
    Jump { nnn: u16 },
    /// 2NNN
    Call { nnn: u16 },
    /// 3XNN
    SkipEqImm { x: u8, nn: u8 },
    /// 4XNN
    SkipNeqImm { x: u8, nn: u8 },
    /// 5XY0
    SkipEq { x: u8, y: u8 },
    /// 6XNN
    SetImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    Set { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    Add { x: u8, y: u8 },
    /// 8XY5
    SubXY { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8, y: u8 },
    /// 8XY7
    SubYX { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0
    SkipNeq { x: u8, y: u8 },
    /// ANNN
    SetIndex { nnn: u16 },
    /// BNNN
    JumpOffset { nnn: u16 },
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipIfKey { x: u8 },
    /// EXA1
    SkipIfNotKey { x: u8 },
    /// FX07
    GetDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddIndex { x: u8 },
    /// FX29
    FontChar { x: u8 },
    /// FX33
    Bcd { x: u8 },
    /// FX55
    Store { x: u8 },
    /// FX65
    Load { x: u8 },
}

impl Instruction {
    /// Decode an instruction word, or `None` if no operation matches it.
    ///
    /// The first nibble selects the group; groups 0x0, 0x8, 0xE and 0xF are
    /// further split on their last nibble or last byte. Groups 0x5 and 0x9
    /// do not look at the last nibble.
    pub fn decode(op: u16) -> Option<Instruction> {
        let digit1 = (op & 0xF000) >> 12;
        let x = ((op & 0x0F00) >> 8) as u8;
        let y = ((op & 0x00F0) >> 4) as u8;
        let n = (op & 0x000F) as u8;
        let nn = (op & 0x00FF) as u8;
        let nnn = op & 0x0FFF;

        let instr = match digit1 {
            0x0 => match nnn {
                0x0E0 => Instruction::Clear,
                0x0EE => Instruction::Return,
                _ => return None,
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipEqImm { x, nn },
            0x4 => Instruction::SkipNeqImm { x, nn },
            0x5 => Instruction::SkipEq { x, y },
            0x6 => Instruction::SetImm { x, nn },
            0x7 => Instruction::AddImm { x, nn },
            0x8 => match n {
                0x0 => Instruction::Set { x, y },
                0x1 => Instruction::Or { x, y },
                0x2 => Instruction::And { x, y },
                0x3 => Instruction::Xor { x, y },
                0x4 => Instruction::Add { x, y },
                0x5 => Instruction::SubXY { x, y },
                0x6 => Instruction::ShiftRight { x, y },
                0x7 => Instruction::SubYX { x, y },
                0xE => Instruction::ShiftLeft { x, y },
                _ => return None,
            },
            0x9 => Instruction::SkipNeq { x, y },
            0xA => Instruction::SetIndex { nnn },
            0xB => Instruction::JumpOffset { nnn },
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => match nn {
                0x9E => Instruction::SkipIfKey { x },
                0xA1 => Instruction::SkipIfNotKey { x },
                _ => return None,
            },
            0xF => match nn {
                0x07 => Instruction::GetDelay { x },
                0x0A => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::FontChar { x },
                0x33 => Instruction::Bcd { x },
                0x55 => Instruction::Store { x },
                0x65 => Instruction::Load { x },
                _ => return None,
            },
            _ => unreachable!("a u16 has only 16 leading nibbles"),
        };
        Some(instr)
    }

    /// Canonical instruction word for this instruction.
    pub fn encode(self) -> u16 {
        fn xy(group: u16, x: u8, y: u8, n: u16) -> u16 {
            group << 12 | (x as u16) << 8 | (y as u16) << 4 | n
        }
        fn xnn(group: u16, x: u8, nn: u8) -> u16 {
            group << 12 | (x as u16) << 8 | nn as u16
        }

        match self {
            Instruction::Clear => 0x00E0,
            Instruction::Return => 0x00EE,
            Instruction::Jump { nnn } => 0x1000 | nnn,
            Instruction::Call { nnn } => 0x2000 | nnn,
            Instruction::SkipEqImm { x, nn } => xnn(0x3, x, nn),
            Instruction::SkipNeqImm { x, nn } => xnn(0x4, x, nn),
            Instruction::SkipEq { x, y } => xy(0x5, x, y, 0x0),
            Instruction::SetImm { x, nn } => xnn(0x6, x, nn),
            Instruction::AddImm { x, nn } => xnn(0x7, x, nn),
            Instruction::Set { x, y } => xy(0x8, x, y, 0x0),
            Instruction::Or { x, y } => xy(0x8, x, y, 0x1),
            Instruction::And { x, y } => xy(0x8, x, y, 0x2),
            Instruction::Xor { x, y } => xy(0x8, x, y, 0x3),
            Instruction::Add { x, y } => xy(0x8, x, y, 0x4),
            Instruction::SubXY { x, y } => xy(0x8, x, y, 0x5),
            Instruction::ShiftRight { x, y } => xy(0x8, x, y, 0x6),
            Instruction::SubYX { x, y } => xy(0x8, x, y, 0x7),
            Instruction::ShiftLeft { x, y } => xy(0x8, x, y, 0xE),
            Instruction::SkipNeq { x, y } => xy(0x9, x, y, 0x0),
            Instruction::SetIndex { nnn } => 0xA000 | nnn,
            Instruction::JumpOffset { nnn } => 0xB000 | nnn,
            Instruction::Random { x, nn } => xnn(0xC, x, nn),
            Instruction::Draw { x, y, n } => xy(0xD, x, y, n as u16),
            Instruction::SkipIfKey { x } => xnn(0xE, x, 0x9E),
            Instruction::SkipIfNotKey { x } => xnn(0xE, x, 0xA1),
            Instruction::GetDelay { x } => xnn(0xF, x, 0x07),
            Instruction::WaitKey { x } => xnn(0xF, x, 0x0A),
            Instruction::SetDelay { x } => xnn(0xF, x, 0x15),
            Instruction::SetSound { x } => xnn(0xF, x, 0x18),
            Instruction::AddIndex { x } => xnn(0xF, x, 0x1E),
            Instruction::FontChar { x } => xnn(0xF, x, 0x29),
            Instruction::Bcd { x } => xnn(0xF, x, 0x33),
            Instruction::Store { x } => xnn(0xF, x, 0x55),
            Instruction::Load { x } => xnn(0xF, x, 0x65),
        }
    }

    /// Whether executing this instruction can change the display.
    pub fn touches_display(self) -> bool {
        matches!(self, Instruction::Clear | Instruction::Draw { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Clear => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump { nnn } => write!(f, "JP {:#05X}", nnn),
            Instruction::Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            Instruction::SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            Instruction::SkipNeqImm { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            Instruction::SkipEq { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::SetImm { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            Instruction::AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Instruction::Set { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::Add { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::SubXY { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            Instruction::SubYX { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            Instruction::SkipNeq { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::SetIndex { nnn } => write!(f, "LD I, {:#05X}", nnn),
            Instruction::JumpOffset { nnn } => write!(f, "JP V0, {:#05X}", nnn),
            Instruction::Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipIfKey { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipIfNotKey { x } => write!(f, "SKNP V{:X}", x),
            Instruction::GetDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::FontChar { x } => write!(f, "LD F, V{:X}", x),
            Instruction::Bcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::Store { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::Load { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction;

    #[test]
    fn decodes_every_group() {
        let cases = [
            (0x00E0, Instruction::Clear),
            (0x00EE, Instruction::Return),
            (0x1234, Instruction::Jump { nnn: 0x234 }),
            (0x2ABC, Instruction::Call { nnn: 0xABC }),
            (0x3A42, Instruction::SkipEqImm { x: 0xA, nn: 0x42 }),
            (0x4B42, Instruction::SkipNeqImm { x: 0xB, nn: 0x42 }),
            (0x5120, Instruction::SkipEq { x: 1, y: 2 }),
            (0x6C07, Instruction::SetImm { x: 0xC, nn: 0x07 }),
            (0x7DFF, Instruction::AddImm { x: 0xD, nn: 0xFF }),
            (0x8124, Instruction::Add { x: 1, y: 2 }),
            (0x812E, Instruction::ShiftLeft { x: 1, y: 2 }),
            (0x9340, Instruction::SkipNeq { x: 3, y: 4 }),
            (0xA050, Instruction::SetIndex { nnn: 0x050 }),
            (0xB300, Instruction::JumpOffset { nnn: 0x300 }),
            (0xC10F, Instruction::Random { x: 1, nn: 0x0F }),
            (0xD015, Instruction::Draw { x: 0, y: 1, n: 5 }),
            (0xE59E, Instruction::SkipIfKey { x: 5 }),
            (0xE5A1, Instruction::SkipIfNotKey { x: 5 }),
            (0xF20A, Instruction::WaitKey { x: 2 }),
            (0xF233, Instruction::Bcd { x: 2 }),
            (0xFF65, Instruction::Load { x: 0xF }),
        ];
        for (word, expected) in cases {
            assert_eq!(Instruction::decode(word), Some(expected), "{:04X}", word);
        }
    }

    #[test]
    fn rejects_unmapped_selectors() {
        for word in [0x0000, 0x0123, 0x00E1, 0x8008, 0x800F, 0xE000, 0xE5A2, 0xF000, 0xF0FF, 0xF566] {
            assert_eq!(Instruction::decode(word), None, "{:04X}", word);
        }
    }

    #[test]
    fn skip_register_groups_ignore_last_nibble() {
        assert_eq!(
            Instruction::decode(0x512F),
            Some(Instruction::SkipEq { x: 1, y: 2 })
        );
        assert_eq!(
            Instruction::decode(0x9341),
            Some(Instruction::SkipNeq { x: 3, y: 4 })
        );
    }

    #[test]
    fn every_decodable_word_encodes_canonically() {
        for word in 0..=u16::MAX {
            if let Some(instr) = Instruction::decode(word) {
                assert_eq!(Instruction::decode(instr.encode()), Some(instr));
            }
        }
    }

    #[test]
    fn mnemonics() {
        let text = |w| Instruction::decode(w).unwrap().to_string();
        assert_eq!(text(0x00E0), "CLS");
        assert_eq!(text(0x1208), "JP 0x208");
        assert_eq!(text(0x612A), "LD V1, 0x2A");
        assert_eq!(text(0xD015), "DRW V0, V1, 5");
        assert_eq!(text(0xFA55), "LD [I], VA");
    }

    #[test]
    fn only_clear_and_draw_touch_display() {
        assert!(Instruction::Clear.touches_display());
        assert!(Instruction::Draw { x: 0, y: 0, n: 1 }.touches_display());
        assert!(!Instruction::Return.touches_display());
        assert!(!Instruction::WaitKey { x: 0 }.touches_display());
    }
}
