/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Fatal conditions raised by the engine.
///
/// Once a cycle fails the engine is halted: the fault is recorded and every
/// later cycle reports it again without touching machine state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("unknown opcode {opcode:#06X} at {pc:#05X}")]
    Decode { opcode: u16, pc: u16 },

    #[error("return with empty call stack at {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("call stack exceeded {depth} entries at {pc:#05X}")]
    StackOverflow { depth: usize, pc: u16 },

    #[error("program is {size} bytes, max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::Chip8Error;

    #[test]
    fn messages_show_hex_addresses() {
        let err = Chip8Error::Decode {
            opcode: 0xF0FF,
            pc: 0x200,
        };
        assert_eq!(err.to_string(), "unknown opcode 0xF0FF at 0x200");

        let err = Chip8Error::StackUnderflow { pc: 0x20A };
        assert_eq!(err.to_string(), "return with empty call stack at 0x20A");
    }
}
