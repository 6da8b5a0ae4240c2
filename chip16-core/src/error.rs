use crate::Opcode;

/// Errors raised while evaluating an instruction
///
/// Any error is fatal to the running program; the machine state is left as
/// it was when the fault was detected.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// No handler is registered for the leading byte
    #[error("unknown opcode {0}")]
    UnknownOpcode(Opcode),
    /// Condition index outside `0x0..=0xE`
    #[error("unknown condition {0:#x}")]
    UnknownCondition(u8),
    /// A 16-bit access would spill past the end of memory
    #[error("address {0:#06x} is out of bounds")]
    AddressOutOfBounds(u16),
    /// `DIV`, `MOD` or `REM` with a zero divisor
    #[error("division by zero")]
    DivideByZero,
    /// A push would write into the I/O region
    #[error("stack overflow (SP = {0:#06x})")]
    StackOverflow(u16),
    /// A pop would read below the start of the stack
    #[error("stack underflow (SP = {0:#06x})")]
    StackUnderflow(u16),
    /// Fewer than 48 bytes are available for `PAL`
    #[error("palette out of bounds ({len} bytes available)")]
    PaletteOutOfBounds {
        /// Bytes available from the source address
        len: usize,
    },
    /// The sprite source runs past the end of memory
    #[error("sprite out of bounds ({len} bytes available, {needed} needed)")]
    SpriteOutOfBounds {
        /// Bytes available from the source address
        len: usize,
        /// Bytes required by the current sprite size
        needed: usize,
    },
    /// PC points into the stack or I/O region
    #[error("PC overflow: PC = {0:#06x}")]
    ProgramCounterOverflow(u16),
    /// SP is below the start of the stack
    #[error("stack pointer underflow: SP = {0:#06x}")]
    StackPointerUnderflow(u16),
    /// SP is in the I/O region
    #[error("stack pointer overflow: SP = {0:#06x}")]
    StackPointerOverflow(u16),
    /// A ROM image overlaps the stack region
    #[error("ROM of {0} bytes does not fit in program memory")]
    RomTooLarge(usize),
}
