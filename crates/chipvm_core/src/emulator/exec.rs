use super::Emulator;
use crate::{
    Chip8Error, Instruction, Result, FONT_ADDRESS, FONT_GLYPH_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use rand::Rng;

impl Emulator {
    /// Execute one decoded instruction fetched from `pc`.
    ///
    /// Returns whether the display changed.
    pub(super) fn execute(&mut self, instr: Instruction, pc: u16) -> Result<bool> {
        match instr {
            // 00E0 - CLS
            Instruction::Clear => {
                self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
            }
            // 00EE - RET
            Instruction::Return => {
                self.pc = self.stack.pop().ok_or(Chip8Error::StackUnderflow { pc })?;
            }
            // 1NNN - JP addr
            Instruction::Jump { nnn } => self.pc = nnn,
            // 2NNN - CALL addr
            Instruction::Call { nnn } => {
                if let Some(limit) = self.stack_limit {
                    if self.stack.len() >= limit {
                        return Err(Chip8Error::StackOverflow { depth: limit, pc });
                    }
                }
                self.stack.push(self.pc);
                self.pc = nnn;
            }
            // 3XNN - SE Vx, byte
            Instruction::SkipEqImm { x, nn } => self.skip_if(self.v(x) == nn),
            // 4XNN - SNE Vx, byte
            Instruction::SkipNeqImm { x, nn } => self.skip_if(self.v(x) != nn),
            // 5XY0 - SE Vx, Vy
            Instruction::SkipEq { x, y } => self.skip_if(self.v(x) == self.v(y)),
            // 6XNN - LD Vx, byte
            Instruction::SetImm { x, nn } => self.set_v(x, nn),
            // 7XNN - ADD Vx, byte; VF untouched
            Instruction::AddImm { x, nn } => self.set_v(x, self.v(x).wrapping_add(nn)),
            // 8XY0 - LD Vx, Vy
            Instruction::Set { x, y } => self.set_v(x, self.v(y)),
            // 8XY1 - OR Vx, Vy
            Instruction::Or { x, y } => self.set_v(x, self.v(x) | self.v(y)),
            // 8XY2 - AND Vx, Vy
            Instruction::And { x, y } => self.set_v(x, self.v(x) & self.v(y)),
            // 8XY3 - XOR Vx, Vy
            Instruction::Xor { x, y } => self.set_v(x, self.v(x) ^ self.v(y)),
            // 8XY4 - ADD Vx, Vy, VF = carry
            Instruction::Add { x, y } => {
                let (val, overflow) = self.v(x).overflowing_add(self.v(y));
                self.set_v(x, val);
                self.v_reg[0xF] = overflow as u8;
            }
            // 8XY5 - SUB Vx, Vy, VF = Vx > Vy
            //
            // The flag is written before the difference, so SUB VF, Vy leaves
            // the difference in VF.
            Instruction::SubXY { x, y } => {
                self.v_reg[0xF] = (self.v(x) > self.v(y)) as u8;
                self.set_v(x, self.v(x).wrapping_sub(self.v(y)));
            }
            // 8XY6 - SHR Vx {, Vy}; the shifted-out bit is dropped
            Instruction::ShiftRight { x, y } => {
                if self.quirks.shift_copies_vy {
                    self.set_v(x, self.v(y));
                }
                self.set_v(x, self.v(x) >> 1);
            }
            // 8XY7 - SUBN Vx, Vy, VF = Vy > Vx
            Instruction::SubYX { x, y } => {
                self.v_reg[0xF] = (self.v(y) > self.v(x)) as u8;
                self.set_v(x, self.v(y).wrapping_sub(self.v(x)));
            }
            // 8XYE - SHL Vx {, Vy}; the shifted-out bit is dropped
            Instruction::ShiftLeft { x, y } => {
                if self.quirks.shift_copies_vy {
                    self.set_v(x, self.v(y));
                }
                self.set_v(x, self.v(x) << 1);
            }
            // 9XY0 - SNE Vx, Vy
            Instruction::SkipNeq { x, y } => self.skip_if(self.v(x) != self.v(y)),
            // ANNN - LD I, addr
            Instruction::SetIndex { nnn } => self.i_reg = nnn,
            // BNNN - JP V0, addr (or JP Vx, addr)
            Instruction::JumpOffset { nnn } => {
                let reg = if self.quirks.jump_offset_uses_vx {
                    (nnn >> 8) as u8
                } else {
                    0
                };
                self.pc = nnn.wrapping_add(self.v(reg) as u16);
            }
            // CXNN - RND Vx, byte
            Instruction::Random { x, nn } => {
                let byte: u8 = self.rng.gen();
                self.set_v(x, byte & nn);
            }
            // DXYN - DRW Vx, Vy, nibble
            Instruction::Draw { x, y, n } => self.draw(x, y, n),
            // EX9E - SKP Vx
            Instruction::SkipIfKey { x } => self.skip_if(self.is_key_pressed(self.v(x))),
            // EXA1 - SKNP Vx
            Instruction::SkipIfNotKey { x } => self.skip_if(!self.is_key_pressed(self.v(x))),
            // FX07 - LD Vx, DT
            Instruction::GetDelay { x } => self.set_v(x, self.delay_timer),
            // FX0A - LD Vx, K
            Instruction::WaitKey { x } => match self.keys.iter().position(|&pressed| pressed) {
                Some(key) => self.set_v(x, key as u8),
                // Re-run this instruction next cycle.
                None => self.pc = self.pc.wrapping_sub(2),
            },
            // FX15 - LD DT, Vx
            Instruction::SetDelay { x } => self.delay_timer = self.v(x),
            // FX18 - LD ST, Vx
            Instruction::SetSound { x } => self.sound_timer = self.v(x),
            // FX1E - ADD I, Vx; VF = 1 on 16-bit carry, otherwise untouched
            Instruction::AddIndex { x } => {
                let (val, overflow) = self.i_reg.overflowing_add(self.v(x) as u16);
                self.i_reg = val;
                if overflow {
                    self.v_reg[0xF] = 1;
                }
            }
            // FX29 - LD F, Vx
            Instruction::FontChar { x } => {
                self.i_reg = FONT_ADDRESS + FONT_GLYPH_SIZE * (self.v(x) & 0xF) as u16;
            }
            // FX33 - LD B, Vx
            Instruction::Bcd { x } => {
                let val = self.v(x);
                self.write_byte(self.i_reg, val / 100);
                self.write_byte(self.i_reg.wrapping_add(1), (val / 10) % 10);
                self.write_byte(self.i_reg.wrapping_add(2), val % 10);
            }
            // FX55 - LD [I], Vx
            Instruction::Store { x } => {
                for offset in 0..=x {
                    self.write_byte(self.i_reg.wrapping_add(offset as u16), self.v(offset));
                }
                self.advance_index_after_transfer(x);
            }
            // FX65 - LD Vx, [I]
            Instruction::Load { x } => {
                for offset in 0..=x {
                    let val = self.read_byte(self.i_reg.wrapping_add(offset as u16));
                    self.set_v(offset, val);
                }
                self.advance_index_after_transfer(x);
            }
        }
        Ok(instr.touches_display())
    }

    #[inline]
    fn v(&self, x: u8) -> u8 {
        self.v_reg[x as usize]
    }

    #[inline]
    fn set_v(&mut self, x: u8, val: u8) {
        self.v_reg[x as usize] = val;
    }

    #[inline]
    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn advance_index_after_transfer(&mut self, x: u8) {
        if self.quirks.load_store_increments_index {
            self.i_reg = self.i_reg.wrapping_add(x as u16 + 1);
        }
    }

    /// XOR an 8xN sprite from memory at I onto the screen at (Vx, Vy).
    ///
    /// The start position wraps; pixels past the right or bottom edge are
    /// clipped. VF is set to 1 if any lit pixel was turned off.
    fn draw(&mut self, x: u8, y: u8, height: u8) {
        let x_coord = self.v(x) as usize % SCREEN_WIDTH;
        let y_coord = self.v(y) as usize % SCREEN_HEIGHT;
        self.v_reg[0xF] = 0;
        for row in 0..height as usize {
            let py = y_coord + row;
            if py >= SCREEN_HEIGHT {
                break;
            }
            let pixels = self.read_byte(self.i_reg.wrapping_add(row as u16));
            for col in 0..8 {
                let px = x_coord + col;
                if px >= SCREEN_WIDTH {
                    break;
                }
                if (pixels >> (7 - col)) & 0x1 == 0 {
                    continue;
                }
                let screen_pixel = &mut self.screen[py * SCREEN_WIDTH + px];
                if *screen_pixel {
                    self.v_reg[0xF] = 1;
                }
                *screen_pixel = !*screen_pixel;
            }
        }
    }
}
