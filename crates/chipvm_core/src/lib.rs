//! CHIP-8 instruction engine.
//!
//! The engine owns memory, registers, the call stack, the display buffer,
//! key state and both timers. It has no clock of its own: the host calls
//! [`Emulator::fetch`] and [`Emulator::decode_and_execute`] (or
//! [`Emulator::step`]) once per emulated cycle, writes key state, reads the
//! display when a cycle reports a refresh, and decrements the timers at 60 Hz.

pub mod config;
pub mod emulator;
pub mod error;
pub mod instruction;

pub use config::{Config, Quirks};
pub use emulator::Emulator;
pub use error::{Chip8Error, Result};
pub use instruction::Instruction;

/// Display width in pixels.
pub const SCREEN_WIDTH: usize = 64;
/// Display height in pixels.
pub const SCREEN_HEIGHT: usize = 32;

/// Addressable memory in bytes (0x000-0xFFF).
pub const RAM_SIZE: usize = 0x1000;
/// Mask applied to every memory access.
pub const ADDRESS_MASK: u16 = 0x0FFF;
/// Programs are loaded, and execution starts, here.
pub const START_ADDRESS: u16 = 0x200;
/// Largest program image that fits between `START_ADDRESS` and the end of RAM.
pub const MAX_PROGRAM_SIZE: usize = RAM_SIZE - START_ADDRESS as usize;

pub const NUM_REGS: usize = 16;
pub const NUM_KEYS: usize = 16;

/// Where the built-in font lives.
pub const FONT_ADDRESS: u16 = 0x050;
/// Bytes per font glyph.
pub const FONT_GLYPH_SIZE: u16 = 5;
pub const FONTSET_SIZE: usize = 80;

pub const FONTSET: [u8; FONTSET_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
