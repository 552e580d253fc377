use anyhow::{bail, Context, Result};
use chipvm_core::{
    Config, Emulator, Instruction, Quirks, MAX_PROGRAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
    START_ADDRESS,
};
use std::path::{Path, PathBuf};
use typed_builder::TypedBuilder;

/// Timer rate, fixed by the machine.
pub const TIMER_HZ: u32 = 60;
/// Default instruction rate.
pub const DEFAULT_IPS: u32 = 700;

/// `JP 0x200`, appended after a loaded program.
const RESTART_INSTRUCTION: [u8; 2] = [0x12, 0x00];

#[derive(Debug, Clone, TypedBuilder)]
pub struct RunOptions {
    pub rom_path: PathBuf,
    #[builder(default = DEFAULT_IPS)]
    pub ips: u32,
    /// Number of 60 Hz frames to run.
    #[builder(default = 60)]
    pub frames: u32,
    #[builder(default)]
    pub quirks: Quirks,
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
    /// List the program instead of running it.
    #[builder(default)]
    pub disassemble: bool,
}

impl RunOptions {
    /// Parse `<rom> [--frames N] [--ips N] [--shift-vy] [--jump-vx] [--index-inc] [--seed N] [--disasm]`.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut rom_path = None;
        let mut ips = DEFAULT_IPS;
        let mut frames = 60;
        let mut quirks = Quirks::legacy();
        let mut seed = None;
        let mut disassemble = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => frames = parse_value(&arg, args.next())?,
                "--ips" => ips = parse_value(&arg, args.next())?,
                "--seed" => seed = Some(parse_value(&arg, args.next())?),
                "--shift-vy" => quirks.shift_copies_vy = true,
                "--jump-vx" => quirks.jump_offset_uses_vx = true,
                "--index-inc" => quirks.load_store_increments_index = true,
                "--disasm" => disassemble = true,
                other if other.starts_with("--") => bail!("Unknown option '{}'", other),
                path => {
                    if rom_path.replace(PathBuf::from(path)).is_some() {
                        bail!("More than one ROM path given");
                    }
                }
            }
        }

        let rom_path = rom_path.context("No ROM path provided")?;
        if ips < TIMER_HZ {
            bail!("--ips must be at least {}", TIMER_HZ);
        }
        Ok(Self {
            rom_path,
            ips,
            frames,
            quirks,
            seed,
            disassemble,
        })
    }

    pub fn config(&self) -> Config {
        Config {
            quirks: self.quirks,
            stack_limit: None,
            seed: self.seed,
        }
    }
}

fn parse_value<T>(flag: &str, value: Option<String>) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = value.with_context(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .with_context(|| format!("Invalid value '{}' for {}", value, flag))
}

/// Read a program image and append a restart jump when there is room.
pub fn load_program(path: &Path) -> Result<Vec<u8>> {
    let mut rom = std::fs::read(path)
        .with_context(|| format!("Failed to read ROM file '{}'", path.display()))?;
    prepare_image(&mut rom)?;
    Ok(rom)
}

fn prepare_image(rom: &mut Vec<u8>) -> Result<()> {
    if rom.len() > MAX_PROGRAM_SIZE {
        bail!(
            "ROM is {} bytes, max size is {} bytes",
            rom.len(),
            MAX_PROGRAM_SIZE
        );
    }
    if rom.len() + RESTART_INSTRUCTION.len() <= MAX_PROGRAM_SIZE {
        rom.extend_from_slice(&RESTART_INSTRUCTION);
    }
    Ok(())
}

/// Drives an [`Emulator`] in 60 Hz frames.
pub struct Runner {
    pub emulator: Emulator,
    cycles_per_frame: u32,
    refreshes: u64,
    beeps: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u32,
    pub refreshes: u64,
    pub beeps: u64,
}

impl Runner {
    pub fn new(emulator: Emulator, ips: u32) -> Self {
        Self {
            emulator,
            cycles_per_frame: (ips / TIMER_HZ).max(1),
            refreshes: 0,
            beeps: 0,
        }
    }

    /// Run one frame of cycles, then tick the timers.
    pub fn run_frame(&mut self) -> Result<()> {
        for _ in 0..self.cycles_per_frame {
            let pc = self.emulator.pc();
            if self
                .emulator
                .step()
                .with_context(|| format!("Emulation stopped at {:#05X}", pc))?
            {
                self.refreshes += 1;
            }
        }
        if self.emulator.tick_timers() {
            self.beeps += 1;
        }
        Ok(())
    }

    pub fn run(&mut self, frames: u32) -> Result<RunStats> {
        for _ in 0..frames {
            self.run_frame()?;
        }
        Ok(RunStats {
            frames,
            refreshes: self.refreshes,
            beeps: self.beeps,
        })
    }
}

/// Render the display as rows of `#` (lit) and `.` (dark).
pub fn render_text(screen: &[bool; SCREEN_WIDTH * SCREEN_HEIGHT]) -> String {
    let mut out = String::with_capacity((SCREEN_WIDTH + 1) * SCREEN_HEIGHT);
    for row in screen.chunks(SCREEN_WIDTH) {
        out.extend(row.iter().map(|&lit| if lit { '#' } else { '.' }));
        out.push('\n');
    }
    out
}

/// List each word of `program` with its load address and mnemonic.
pub fn disassemble(program: &[u8]) -> String {
    let mut out = String::new();
    for (i, word) in program.chunks(2).enumerate() {
        let addr = START_ADDRESS as usize + i * 2;
        let op = match *word {
            [hi, lo] => u16::from_be_bytes([hi, lo]),
            [hi] => u16::from(hi) << 8,
            _ => continue,
        };
        let text = Instruction::decode(op)
            .map(|instr| instr.to_string())
            .unwrap_or_else(|| "???".to_string());
        out.push_str(&format!("{:03X}: {:04X}  {}\n", addr, op, text));
    }
    out
}

pub fn run(options: &RunOptions) -> Result<()> {
    let rom = load_program(&options.rom_path)?;
    if options.disassemble {
        print!("{}", disassemble(&rom));
        return Ok(());
    }

    let emulator = Emulator::new(options.config(), &rom)?;
    let mut runner = Runner::new(emulator, options.ips);
    let stats = runner.run(options.frames)?;
    log::info!(
        "Ran {} frames: {} display refreshes, {} beeps",
        stats.frames,
        stats.refreshes,
        stats.beeps
    );
    print!("{}", render_text(runner.emulator.get_display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let options = RunOptions::from_args(args(&[
            "game.ch8",
            "--frames",
            "10",
            "--ips",
            "1200",
            "--shift-vy",
            "--index-inc",
            "--seed",
            "3",
        ]))
        .unwrap();
        assert_eq!(options.rom_path, PathBuf::from("game.ch8"));
        assert_eq!(options.frames, 10);
        assert_eq!(options.ips, 1200);
        assert_eq!(options.seed, Some(3));
        assert!(options.quirks.shift_copies_vy);
        assert!(!options.quirks.jump_offset_uses_vx);
        assert!(options.quirks.load_store_increments_index);
        assert!(!options.disassemble);
    }

    #[test]
    fn defaults_match_builder() {
        let parsed = RunOptions::from_args(args(&["game.ch8"])).unwrap();
        let built = RunOptions::builder().rom_path("game.ch8".into()).build();
        assert_eq!(parsed.ips, built.ips);
        assert_eq!(parsed.frames, built.frames);
        assert_eq!(parsed.quirks, built.quirks);
        assert_eq!(parsed.config(), built.config());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(RunOptions::from_args(args(&[])).is_err());
        assert!(RunOptions::from_args(args(&["a.ch8", "b.ch8"])).is_err());
        assert!(RunOptions::from_args(args(&["a.ch8", "--frames"])).is_err());
        assert!(RunOptions::from_args(args(&["a.ch8", "--frames", "ten"])).is_err());
        assert!(RunOptions::from_args(args(&["a.ch8", "--turbo"])).is_err());
        assert!(RunOptions::from_args(args(&["a.ch8", "--ips", "30"])).is_err());
    }

    #[test]
    fn image_gets_restart_jump_when_it_fits() {
        let mut rom = vec![0x00, 0xE0];
        prepare_image(&mut rom).unwrap();
        assert_eq!(rom, [0x00, 0xE0, 0x12, 0x00]);

        let mut full = vec![0u8; MAX_PROGRAM_SIZE];
        prepare_image(&mut full).unwrap();
        assert_eq!(full.len(), MAX_PROGRAM_SIZE);

        let mut too_big = vec![0u8; MAX_PROGRAM_SIZE + 1];
        assert!(prepare_image(&mut too_big).is_err());
    }

    #[test]
    fn renders_rows() {
        let mut screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
        screen[0] = true;
        screen[SCREEN_WIDTH + 1] = true;
        let text = render_text(&screen);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), SCREEN_HEIGHT);
        assert!(lines[0].starts_with("#."));
        assert!(lines[1].starts_with(".#."));
        assert!(lines.iter().all(|line| line.len() == SCREEN_WIDTH));
    }

    #[test]
    fn disassembles_words() {
        let listing = disassemble(&[0x00, 0xE0, 0xF0, 0xFF, 0x12]);
        assert_eq!(
            listing,
            "200: 00E0  CLS\n202: F0FF  ???\n204: 1200  JP 0x200\n"
        );
    }
}
