mod exec;

use crate::{
    Chip8Error, Config, Instruction, Quirks, Result, ADDRESS_MASK, FONTSET, FONT_ADDRESS,
    MAX_PROGRAM_SIZE, NUM_KEYS, NUM_REGS, RAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, START_ADDRESS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub type Screen = [bool; SCREEN_WIDTH * SCREEN_HEIGHT];

pub struct Emulator {
    /// program counter
    pc: u16,
    ram: [u8; RAM_SIZE],
    /// display, row-major
    screen: Screen,
    /// V registers, VF doubles as the flag register
    v_reg: [u8; NUM_REGS],
    /// I register
    i_reg: u16,
    /// Return addresses pushed by CALL
    stack: Vec<u16>,
    stack_limit: Option<usize>,
    keys: [bool; NUM_KEYS],
    /// delay timer
    delay_timer: u8,
    /// sound timer
    sound_timer: u8,
    quirks: Quirks,
    rng: StdRng,
    /// First fatal error, after which the engine refuses to run.
    fault: Option<Chip8Error>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Emulator {
    /// Create an engine with `program` loaded at `START_ADDRESS`.
    pub fn new(config: Config, program: &[u8]) -> Result<Self> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let mut emu = Self::with_config(config);
        let start = START_ADDRESS as usize;
        emu.ram[start..start + program.len()].copy_from_slice(program);
        log::debug!(
            "Loaded {} byte program, quirks: {:?}, stack limit: {:?}",
            program.len(),
            emu.quirks,
            emu.stack_limit
        );
        Ok(emu)
    }

    fn with_config(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut emu = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack: Vec::new(),
            stack_limit: config.stack_limit,
            keys: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            quirks: config.quirks,
            rng,
            fault: None,
        };
        let font = FONT_ADDRESS as usize;
        emu.ram[font..font + FONTSET.len()].copy_from_slice(&FONTSET);
        emu
    }

    /// Read the instruction word at PC and advance PC by 2.
    pub fn fetch(&mut self) -> u16 {
        let byte1 = self.read_byte(self.pc) as u16;
        let byte2 = self.read_byte(self.pc.wrapping_add(1)) as u16;
        self.pc = self.pc.wrapping_add(2);
        byte1 << 8 | byte2
    }

    /// Decode `op` and execute it.
    ///
    /// Returns whether the display changed. A decode error, stack underflow
    /// or stack overflow halts the engine: the error is returned now and on
    /// every later call.
    pub fn decode_and_execute(&mut self, op: u16) -> Result<bool> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        let pc = self.pc.wrapping_sub(2);
        let result = match Instruction::decode(op) {
            Some(instr) => {
                log::trace!("{:03X}: {:04X} {}", pc & ADDRESS_MASK, op, instr);
                self.execute(instr, pc)
            }
            None => Err(Chip8Error::Decode { opcode: op, pc }),
        };
        if let Err(err) = &result {
            log::warn!("Halting: {}", err);
            self.fault = Some(err.clone());
        }
        result
    }

    /// One full cycle: fetch, then decode and execute.
    pub fn step(&mut self) -> Result<bool> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        let op = self.fetch();
        self.decode_and_execute(op)
    }

    /// Decrement both timers; meant to be called at 60 Hz.
    ///
    /// Returns true on the tick where the sound timer reaches zero.
    pub fn tick_timers(&mut self) -> bool {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
            if self.sound_timer == 0 {
                log::trace!("Sound timer expired");
                return true;
            }
        }
        false
    }

    pub fn is_sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    fn read_byte(&self, addr: u16) -> u8 {
        self.ram[(addr & ADDRESS_MASK) as usize]
    }

    fn write_byte(&mut self, addr: u16, val: u8) {
        self.ram[(addr & ADDRESS_MASK) as usize] = val;
    }

    fn is_key_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    pub fn fault(&self) -> Option<&Chip8Error> {
        self.fault.as_ref()
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i_reg
    }

    pub fn register(&self, x: usize) -> u8 {
        self.v_reg[x]
    }

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v_reg
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    pub fn get_display(&self) -> &Screen {
        &self.screen
    }

    pub fn display_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Pixel at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.screen[y * SCREEN_WIDTH + x]
    }

    pub fn set_key(&mut self, idx: usize, pressed: bool) {
        assert!(idx < NUM_KEYS, "Invalid key index: {}", idx);
        self.keys[idx] = pressed;
    }

    pub fn keys_mut(&mut self) -> &mut [bool; NUM_KEYS] {
        &mut self.keys
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, val: u8) {
        self.delay_timer = val;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, val: u8) {
        self.sound_timer = val;
    }
}
