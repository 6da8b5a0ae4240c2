//! Memory map, RAM, and CPU registers
use crate::{Error, Flags, Opcode};
use static_assertions::const_assert;

/// Total memory size
pub const MEM_SIZE: usize = 65536;

/// Start address of program RAM
pub const RAM_START: u16 = 0x0000;

/// Start address of the stack, which grows upwards
pub const STACK_START: u16 = 0xFDF0;

/// Start address of the (unimplemented) I/O registers
pub const IO_START: u16 = 0xFFF0;

/// Highest address at which a 16-bit value can be read or written
pub const POINTER_MAX: u16 = 0xFFFE;

const_assert!(RAM_START < STACK_START);
const_assert!(STACK_START < IO_START);
const_assert!(POINTER_MAX as usize == MEM_SIZE - 2);

/// A 16-bit address
pub type Pointer = u16;

/// 64 KiB of zero-initialized memory
///
/// Word accesses are little-endian and bounds-checked against
/// [`POINTER_MAX`].
#[derive(Clone)]
pub struct Ram(Box<[u8; MEM_SIZE]>);

impl Ram {
    /// Builds a new zero-initialized RAM
    pub fn new() -> Self {
        Ram(Box::new([0u8; MEM_SIZE]))
    }

    /// Reads a signed word
    #[inline]
    pub fn read_i16(&self, addr: Pointer) -> Result<i16, Error> {
        if addr > POINTER_MAX {
            return Err(Error::AddressOutOfBounds(addr));
        }
        let i = usize::from(addr);
        Ok(i16::from_le_bytes([self.0[i], self.0[i + 1]]))
    }

    /// Writes a signed word
    #[inline]
    pub fn write_i16(&mut self, addr: Pointer, v: i16) -> Result<(), Error> {
        if addr > POINTER_MAX {
            return Err(Error::AddressOutOfBounds(addr));
        }
        let i = usize::from(addr);
        self.0[i..i + 2].copy_from_slice(&v.to_le_bytes());
        Ok(())
    }

    /// Reads a pointer
    #[inline]
    pub fn read_pointer(&self, addr: Pointer) -> Result<Pointer, Error> {
        self.read_i16(addr).map(|v| v as u16)
    }

    /// Returns every byte from `addr` to the end of memory
    ///
    /// This is the source window used by palette and sprite loads, which do
    /// their own length checks.
    #[inline]
    pub fn window(&self, addr: Pointer) -> &[u8] {
        &self.0[usize::from(addr)..]
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for Ram {
    type Target = [u8; MEM_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Ram {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// CPU registers and memory
#[derive(Clone)]
pub struct State {
    /// Program counter
    pub pc: Pointer,
    /// Stack pointer
    pub sp: Pointer,
    /// General purpose registers `R0..RF`
    pub regs: [i16; 16],
    /// Status flags
    pub flags: Flags,
    /// Main memory
    pub ram: Ram,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// Builds a freshly reset state
    pub fn new() -> Self {
        Self {
            pc: RAM_START,
            sp: STACK_START,
            regs: [0; 16],
            flags: Flags::default(),
            ram: Ram::new(),
        }
    }

    /// Copies a program image to the start of RAM
    ///
    /// The image must not overlap the stack.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Error> {
        let start = usize::from(RAM_START);
        if rom.len() > usize::from(STACK_START) - start {
            return Err(Error::RomTooLarge(rom.len()));
        }
        self.ram[start..][..rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Reads the instruction word at `PC`, without moving `PC`
    #[inline]
    pub fn fetch(&self) -> Result<Opcode, Error> {
        let i = usize::from(self.pc);
        let b = self
            .ram
            .get(i..i + 4)
            .ok_or(Error::AddressOutOfBounds(self.pc))?;
        Ok(Opcode::from_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Pushes a word onto the stack
    pub fn push(&mut self, v: i16) -> Result<(), Error> {
        self.reserve(2)?;
        self.ram.write_i16(self.sp, v)?;
        self.sp += 2;
        Ok(())
    }

    /// Pops a word off the stack
    pub fn pop(&mut self) -> Result<i16, Error> {
        self.release(2)?;
        self.sp -= 2;
        self.ram.read_i16(self.sp)
    }

    /// Checks that `n` bytes can be pushed without reaching the I/O region
    #[inline]
    pub(crate) fn reserve(&self, n: u16) -> Result<(), Error> {
        if u32::from(self.sp) + u32::from(n) >= u32::from(IO_START) {
            Err(Error::StackOverflow(self.sp))
        } else {
            Ok(())
        }
    }

    /// Checks that `n` bytes can be popped without leaving the stack
    #[inline]
    pub(crate) fn release(&self, n: u16) -> Result<(), Error> {
        if u32::from(self.sp) < u32::from(STACK_START) + u32::from(n) {
            Err(Error::StackUnderflow(self.sp))
        } else {
            Ok(())
        }
    }

    /// Checks the state invariants
    ///
    /// `PC` must point below the stack, and `SP` must lie within it.
    pub fn check(&self) -> Result<(), Error> {
        if self.pc >= STACK_START {
            Err(Error::ProgramCounterOverflow(self.pc))
        } else if self.sp < STACK_START {
            Err(Error::StackPointerUnderflow(self.sp))
        } else if self.sp >= IO_START {
            Err(Error::StackPointerOverflow(self.sp))
        } else {
            Ok(())
        }
    }
}
