//! Chip16 virtual machine
//!
//! The [`Vm`] owns the CPU state, the graphics coprocessor, and a random
//! source. Instructions are applied one at a time with [`Vm::eval`], or fetched
//! from memory and applied with [`Vm::step`].
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod alu;
mod error;
mod flags;
pub mod graphics;
pub mod op;
mod opcode;
mod rng;
pub mod state;

pub use error::Error;
pub use flags::{Condition, Flags};
pub use graphics::{Color, Graphics};
pub use opcode::Opcode;
pub use rng::Random;
pub use state::{Pointer, Ram, State};

use log::trace;
use op::{IMM, REG, REG3, SELF};
use rand::{rngs::StdRng, SeedableRng};

/// Chip16 processor, graphics, and random source
pub struct Vm<R = StdRng> {
    state: State,
    gfx: Graphics,
    rng: R,
}

impl Default for Vm<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm<StdRng> {
    /// Builds a new machine, seeding `RND` from system entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Builds a new machine with a reproducible `RND` sequence
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Random> Vm<R> {
    /// Builds a new machine with the given random source
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: State::new(),
            gfx: Graphics::new(),
            rng,
        }
    }

    /// Returns the CPU state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the CPU state, mutably
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Returns the graphics state
    pub fn graphics(&self) -> &Graphics {
        &self.gfx
    }

    /// Returns the graphics state, mutably
    pub fn graphics_mut(&mut self) -> &mut Graphics {
        &mut self.gfx
    }

    /// Copies a program to the start of RAM and points `PC` at `start`
    pub fn load(&mut self, rom: &[u8], start: Pointer) -> Result<(), Error> {
        self.state.load(rom)?;
        self.state.pc = start;
        Ok(())
    }

    /// Fetches the instruction at `PC`, advances `PC`, and evaluates it
    ///
    /// Returns the instruction that was evaluated.
    pub fn step(&mut self) -> Result<Opcode, Error> {
        let pc = self.state.pc;
        let o = self.state.fetch()?;
        trace!("{pc:04x}: {o} {}", op::mnemonic(o.op()).unwrap_or("???"));
        self.state.pc = pc.wrapping_add(4);
        self.exec(o)?;
        Ok(o)
    }

    /// Evaluates a single instruction
    ///
    /// `PC` is not advanced beforehand; that's up to the caller, so that
    /// calls push the address of the following instruction.
    ///
    /// After the handler runs, the state invariants are checked and any
    /// violation is returned as an error.
    pub fn eval(&mut self, o: Opcode) -> Result<(), Error> {
        trace!("{o} {}", op::mnemonic(o.op()).unwrap_or("???"));
        self.exec(o)
    }

    fn exec(&mut self, o: Opcode) -> Result<(), Error> {
        self.op(o)?;
        self.state.check()
    }

    fn op(&mut self, o: Opcode) -> Result<(), Error> {
        let s = &mut self.state;
        let g = &mut self.gfx;
        match o.op() {
            0x00 => op::nop(s, o),
            0x01 => op::cls(g, o),
            0x02 => op::vblnk(g, o),
            0x03 => op::bgc(g, o),
            0x04 => op::spr(g, o),
            0x05 => op::drw::<IMM>(s, g, o),
            0x06 => op::drw::<REG3>(s, g, o),
            0x07 => op::rnd(s, &mut self.rng, o),
            0x08 => op::flip(g, o),

            0x10 => op::jmp(s, o),
            0x11 => op::jmc(s, o),
            0x12 => op::jx(s, o),
            0x13 => op::jme(s, o),
            0x14 => op::call_hhll(s, o),
            0x15 => op::ret(s, o),
            0x16 => op::jmp_rx(s, o),
            0x17 => op::cx(s, o),
            0x18 => op::call_rx(s, o),

            0x20 => op::ldi(s, o),
            0x21 => op::ldi_sp(s, o),
            0x22 => op::ldm::<IMM>(s, o),
            0x23 => op::ldm::<REG>(s, o),
            0x24 => op::mov(s, o),

            0x30 => op::stm::<IMM>(s, o),
            0x31 => op::stm::<REG>(s, o),

            0x40 => op::add::<IMM>(s, o),
            0x41 => op::add::<REG>(s, o),
            0x42 => op::add::<REG3>(s, o),

            0x50 => op::sub::<IMM>(s, o),
            0x51 => op::sub::<REG>(s, o),
            0x52 => op::sub::<REG3>(s, o),
            0x53 => op::cmp::<IMM>(s, o),
            0x54 => op::cmp::<REG>(s, o),

            0x60 => op::and::<IMM>(s, o),
            0x61 => op::and::<REG>(s, o),
            0x62 => op::and::<REG3>(s, o),
            0x63 => op::tst::<IMM>(s, o),
            0x64 => op::tst::<REG>(s, o),

            0x70 => op::or::<IMM>(s, o),
            0x71 => op::or::<REG>(s, o),
            0x72 => op::or::<REG3>(s, o),

            0x80 => op::xor::<IMM>(s, o),
            0x81 => op::xor::<REG>(s, o),
            0x82 => op::xor::<REG3>(s, o),

            0x90 => op::mul::<IMM>(s, o),
            0x91 => op::mul::<REG>(s, o),
            0x92 => op::mul::<REG3>(s, o),

            0xA0 => op::div::<IMM>(s, o),
            0xA1 => op::div::<REG>(s, o),
            0xA2 => op::div::<REG3>(s, o),
            0xA3 => op::modulo::<IMM>(s, o),
            0xA4 => op::modulo::<REG>(s, o),
            0xA5 => op::modulo::<REG3>(s, o),
            0xA6 => op::rem::<IMM>(s, o),
            0xA7 => op::rem::<REG>(s, o),
            0xA8 => op::rem::<REG3>(s, o),

            0xB0 => op::shl::<IMM>(s, o),
            0xB1 => op::shr::<IMM>(s, o),
            0xB2 => op::sar::<IMM>(s, o),
            0xB3 => op::shl::<REG>(s, o),
            0xB4 => op::shr::<REG>(s, o),
            0xB5 => op::sar::<REG>(s, o),

            0xC0 => op::push(s, o),
            0xC1 => op::pop(s, o),
            0xC2 => op::pushall(s, o),
            0xC3 => op::popall(s, o),
            0xC4 => op::pushf(s, o),
            0xC5 => op::popf(s, o),

            0xD0 => op::pal::<IMM>(s, g, o),
            0xD1 => op::pal::<REG>(s, g, o),

            0xE0 => op::not::<IMM>(s, o),
            0xE1 => op::not::<SELF>(s, o),
            0xE2 => op::not::<REG>(s, o),
            0xE3 => op::neg::<IMM>(s, o),
            0xE4 => op::neg::<SELF>(s, o),
            0xE5 => op::neg::<REG>(s, o),

            _ => Err(Error::UnknownOpcode(o)),
        }
    }
}
