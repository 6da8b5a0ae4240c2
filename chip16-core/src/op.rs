//! Instruction handlers
//!
//! Each handler applies one decoded instruction to the machine state. None of
//! them touch `PC` except for jumps, calls and returns; advancing past the
//! instruction is the caller's job.
use crate::{
    alu,
    graphics::Graphics,
    state::{Pointer, State},
    Error, Opcode, Random,
};

/// `Rx, HHLL` operands, result in `Rx`
pub(crate) const IMM: u8 = 0;
/// `Rx, Ry` operands, result in `Rx`
pub(crate) const REG: u8 = 1;
/// `Rx, Ry, Rz` operands, result in `Rz`
pub(crate) const REG3: u8 = 2;
/// `Rx` is both source and destination (unary operations only)
pub(crate) const SELF: u8 = 3;

/// Returns `(destination, lhs, rhs)` for a binary operation
#[inline]
fn operands<const FORM: u8>(s: &State, o: Opcode) -> (usize, i16, i16) {
    match FORM {
        IMM => (o.x(), s.regs[o.x()], o.hhll() as i16),
        REG => (o.x(), s.regs[o.x()], s.regs[o.y()]),
        _ => (o.z(), s.regs[o.x()], s.regs[o.y()]),
    }
}

/// Returns `(destination, source)` for a unary operation
#[inline]
fn operand<const FORM: u8>(s: &State, o: Opcode) -> (usize, i16) {
    match FORM {
        IMM => (o.x(), o.hhll() as i16),
        SELF => (o.x(), s.regs[o.x()]),
        _ => (o.x(), s.regs[o.y()]),
    }
}

/// Returns the mnemonic for an operation code, if it is implemented
///
/// The set of named codes is exactly the set that the evaluator dispatches.
pub fn mnemonic(code: u8) -> Option<&'static str> {
    let s = match code {
        0x00 => "NOP",
        0x01 => "CLS",
        0x02 => "VBLNK",
        0x03 => "BGC N",
        0x04 => "SPR HHLL",
        0x05 => "DRW Rx, Ry, HHLL",
        0x06 => "DRW Rx, Ry, Rz",
        0x07 => "RND Rx, HHLL",
        0x08 => "FLIP",
        0x10 => "JMP HHLL",
        0x11 => "JMC HHLL",
        0x12 => "Jx HHLL",
        0x13 => "JME Rx, Ry, HHLL",
        0x14 => "CALL HHLL",
        0x15 => "RET",
        0x16 => "JMP Rx",
        0x17 => "Cx HHLL",
        0x18 => "CALL Rx",
        0x20 => "LDI Rx, HHLL",
        0x21 => "LDI SP, HHLL",
        0x22 => "LDM Rx, HHLL",
        0x23 => "LDM Rx, Ry",
        0x24 => "MOV Rx, Ry",
        0x30 => "STM Rx, HHLL",
        0x31 => "STM Rx, Ry",
        0x40 => "ADDI Rx, HHLL",
        0x41 => "ADD Rx, Ry",
        0x42 => "ADD Rx, Ry, Rz",
        0x50 => "SUBI Rx, HHLL",
        0x51 => "SUB Rx, Ry",
        0x52 => "SUB Rx, Ry, Rz",
        0x53 => "CMPI Rx, HHLL",
        0x54 => "CMP Rx, Ry",
        0x60 => "ANDI Rx, HHLL",
        0x61 => "AND Rx, Ry",
        0x62 => "AND Rx, Ry, Rz",
        0x63 => "TSTI Rx, HHLL",
        0x64 => "TST Rx, Ry",
        0x70 => "ORI Rx, HHLL",
        0x71 => "OR Rx, Ry",
        0x72 => "OR Rx, Ry, Rz",
        0x80 => "XORI Rx, HHLL",
        0x81 => "XOR Rx, Ry",
        0x82 => "XOR Rx, Ry, Rz",
        0x90 => "MULI Rx, HHLL",
        0x91 => "MUL Rx, Ry",
        0x92 => "MUL Rx, Ry, Rz",
        0xA0 => "DIVI Rx, HHLL",
        0xA1 => "DIV Rx, Ry",
        0xA2 => "DIV Rx, Ry, Rz",
        0xA3 => "MODI Rx, HHLL",
        0xA4 => "MOD Rx, Ry",
        0xA5 => "MOD Rx, Ry, Rz",
        0xA6 => "REMI Rx, HHLL",
        0xA7 => "REM Rx, Ry",
        0xA8 => "REM Rx, Ry, Rz",
        0xB0 => "SHL Rx, N",
        0xB1 => "SHR Rx, N",
        0xB2 => "SAR Rx, N",
        0xB3 => "SHL Rx, Ry",
        0xB4 => "SHR Rx, Ry",
        0xB5 => "SAR Rx, Ry",
        0xC0 => "PUSH Rx",
        0xC1 => "POP Rx",
        0xC2 => "PUSHALL",
        0xC3 => "POPALL",
        0xC4 => "PUSHF",
        0xC5 => "POPF",
        0xD0 => "PAL HHLL",
        0xD1 => "PAL Rx",
        0xE0 => "NOTI Rx, HHLL",
        0xE1 => "NOT Rx",
        0xE2 => "NOT Rx, Ry",
        0xE3 => "NEGI Rx, HHLL",
        0xE4 => "NEG Rx",
        0xE5 => "NEG Rx, Ry",
        _ => return None,
    };
    Some(s)
}

////////////////////////////////////////////////////////////////////////////////
// Miscellaneous and graphics

/// No operation
#[inline]
pub fn nop(_: &mut State, _: Opcode) -> Result<(), Error> {
    Ok(())
}

/// Clear screen
///
/// ```text
/// CLS
/// ```
///
/// Erases the foreground and resets the background index to 0.
#[inline]
pub fn cls(gfx: &mut Graphics, _: Opcode) -> Result<(), Error> {
    gfx.clear();
    Ok(())
}

/// Wait for vertical blank
///
/// The wait itself is performed by the host, which polls
/// [`Graphics::take_vblank`].
#[inline]
pub fn vblnk(gfx: &mut Graphics, _: Opcode) -> Result<(), Error> {
    gfx.request_vblank();
    Ok(())
}

/// Set background color
///
/// ```text
/// BGC N
/// ```
#[inline]
pub fn bgc(gfx: &mut Graphics, o: Opcode) -> Result<(), Error> {
    gfx.set_background(o.n());
    Ok(())
}

/// Set sprite size
///
/// ```text
/// SPR HHLL
/// ```
///
/// Width (in bytes) is `LL`, height is `HH`.
#[inline]
pub fn spr(gfx: &mut Graphics, o: Opcode) -> Result<(), Error> {
    gfx.set_sprite_size(o.ll(), o.hh());
    Ok(())
}

/// Draw sprite
///
/// ```text
/// DRW Rx, Ry, HHLL
/// DRW Rx, Ry, Rz
/// ```
///
/// Draws the sprite stored at `HHLL` (or `[Rz]`) at position `(Rx, Ry)`.
/// Carry is set if any pixel collided with an existing pixel.
#[inline]
pub fn drw<const FORM: u8>(
    s: &mut State,
    gfx: &mut Graphics,
    o: Opcode,
) -> Result<(), Error> {
    let addr: Pointer = match FORM {
        IMM => o.hhll(),
        _ => s.regs[o.z()] as u16,
    };
    let hit = gfx.draw_sprite(s.regs[o.x()], s.regs[o.y()], s.ram.window(addr))?;
    s.flags.set_carry(hit);
    Ok(())
}

/// Random number
///
/// ```text
/// RND Rx, HHLL
/// ```
///
/// Stores a random value in `[0, HHLL]` (inclusive) in `Rx`.
#[inline]
pub fn rnd(s: &mut State, rng: &mut impl Random, o: Opcode) -> Result<(), Error> {
    let max = u32::from(o.hhll()) + 1;
    s.regs[o.x()] = rng.below(max) as u16 as i16;
    Ok(())
}

/// Set sprite flipping
///
/// ```text
/// FLIP 0, 0   08 00 00 00
/// FLIP 0, 1   08 00 00 01
/// FLIP 1, 0   08 00 00 02
/// FLIP 1, 1   08 00 00 03
/// ```
#[inline]
pub fn flip(gfx: &mut Graphics, o: Opcode) -> Result<(), Error> {
    gfx.set_flip(o.hh() & 0b10 != 0, o.hh() & 0b01 != 0);
    Ok(())
}

/// Load palette
///
/// ```text
/// PAL HHLL
/// PAL Rx
/// ```
///
/// Reads 48 bytes of BGR triplets from `HHLL` (or `[Rx]`).
#[inline]
pub fn pal<const FORM: u8>(
    s: &mut State,
    gfx: &mut Graphics,
    o: Opcode,
) -> Result<(), Error> {
    let addr: Pointer = match FORM {
        IMM => o.hhll(),
        _ => s.regs[o.x()] as u16,
    };
    gfx.load_palette(s.ram.window(addr))
}

////////////////////////////////////////////////////////////////////////////////
// Control flow

fn call(s: &mut State, target: Pointer) -> Result<(), Error> {
    let pc = s.pc as i16;
    s.push(pc)?;
    s.pc = target;
    Ok(())
}

/// Unconditional jump to `HHLL`
#[inline]
pub fn jmp(s: &mut State, o: Opcode) -> Result<(), Error> {
    s.pc = o.hhll();
    Ok(())
}

/// Jump to `HHLL` if carry is set
#[inline]
pub fn jmc(s: &mut State, o: Opcode) -> Result<(), Error> {
    if s.flags.carry() {
        s.pc = o.hhll();
    }
    Ok(())
}

/// Conditional jump
///
/// ```text
/// Jx HHLL
/// ```
///
/// The condition index is stored in the `X` nibble.
#[inline]
pub fn jx(s: &mut State, o: Opcode) -> Result<(), Error> {
    if s.flags.condition(o.x() as u8)? {
        s.pc = o.hhll();
    }
    Ok(())
}

/// Jump to `HHLL` if `Rx == Ry`
#[inline]
pub fn jme(s: &mut State, o: Opcode) -> Result<(), Error> {
    if s.regs[o.x()] == s.regs[o.y()] {
        s.pc = o.hhll();
    }
    Ok(())
}

/// Call subroutine at `HHLL`
///
/// Pushes `PC`, which the caller has already moved to the next instruction.
#[inline]
pub fn call_hhll(s: &mut State, o: Opcode) -> Result<(), Error> {
    call(s, o.hhll())
}

/// Return from subroutine
#[inline]
pub fn ret(s: &mut State, _: Opcode) -> Result<(), Error> {
    s.pc = s.pop()? as u16;
    Ok(())
}

/// Unconditional jump to `Rx`
#[inline]
pub fn jmp_rx(s: &mut State, o: Opcode) -> Result<(), Error> {
    s.pc = s.regs[o.x()] as u16;
    Ok(())
}

/// Conditional call
///
/// ```text
/// Cx HHLL
/// ```
#[inline]
pub fn cx(s: &mut State, o: Opcode) -> Result<(), Error> {
    if s.flags.condition(o.x() as u8)? {
        call(s, o.hhll())?;
    }
    Ok(())
}

/// Call subroutine at `Rx`
#[inline]
pub fn call_rx(s: &mut State, o: Opcode) -> Result<(), Error> {
    let target = s.regs[o.x()] as u16;
    call(s, target)
}

////////////////////////////////////////////////////////////////////////////////
// Loads and stores

/// `Rx = HHLL`
#[inline]
pub fn ldi(s: &mut State, o: Opcode) -> Result<(), Error> {
    s.regs[o.x()] = o.hhll() as i16;
    Ok(())
}

/// `SP = HHLL`
///
/// An out-of-stack value is caught by the post-instruction check.
#[inline]
pub fn ldi_sp(s: &mut State, o: Opcode) -> Result<(), Error> {
    s.sp = o.hhll();
    Ok(())
}

/// Load `Rx` from `[HHLL]` or `[Ry]`
#[inline]
pub fn ldm<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let addr = match FORM {
        IMM => o.hhll(),
        _ => s.regs[o.y()] as u16,
    };
    s.regs[o.x()] = s.ram.read_i16(addr)?;
    Ok(())
}

/// `Rx = Ry`
#[inline]
pub fn mov(s: &mut State, o: Opcode) -> Result<(), Error> {
    s.regs[o.x()] = s.regs[o.y()];
    Ok(())
}

/// Store `Rx` to `[HHLL]` or `[Ry]`
#[inline]
pub fn stm<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let addr = match FORM {
        IMM => o.hhll(),
        _ => s.regs[o.y()] as u16,
    };
    s.ram.write_i16(addr, s.regs[o.x()])
}

////////////////////////////////////////////////////////////////////////////////
// Arithmetic

/// Add
///
/// ```text
/// ADDI Rx, HHLL    Rx = Rx + HHLL
/// ADD  Rx, Ry      Rx = Rx + Ry
/// ADD  Rx, Ry, Rz  Rz = Rx + Ry
/// ```
///
/// Sets carry, zero, overflow and negative.
#[inline]
pub fn add<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, a, b) = operands::<FORM>(s, o);
    let (v, flags) = alu::add16(a, b, s.flags);
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

/// Subtract
///
/// ```text
/// SUBI Rx, HHLL    Rx = Rx - HHLL
/// SUB  Rx, Ry      Rx = Rx - Ry
/// SUB  Rx, Ry, Rz  Rz = Rx - Ry
/// ```
///
/// Sets carry (borrow), zero, overflow and negative.
#[inline]
pub fn sub<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, a, b) = operands::<FORM>(s, o);
    let (v, flags) = alu::sub16(a, b, s.flags);
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

/// Compare, i.e. subtract without storing the result
///
/// ```text
/// CMPI Rx, HHLL
/// CMP  Rx, Ry
/// ```
#[inline]
pub fn cmp<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (_, a, b) = operands::<FORM>(s, o);
    s.flags = alu::sub16(a, b, s.flags).1;
    Ok(())
}

/// Multiply
///
/// ```text
/// MULI Rx, HHLL    Rx = Rx * HHLL
/// MUL  Rx, Ry      Rx = Rx * Ry
/// MUL  Rx, Ry, Rz  Rz = Rx * Ry
/// ```
///
/// Carry is set if the product doesn't fit in 16 bits.
#[inline]
pub fn mul<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, a, b) = operands::<FORM>(s, o);
    let (v, flags) = alu::mul16(a, b, s.flags);
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

/// Divide, rounding toward zero
///
/// ```text
/// DIVI Rx, HHLL    Rx = Rx / HHLL
/// DIV  Rx, Ry      Rx = Rx / Ry
/// DIV  Rx, Ry, Rz  Rz = Rx / Ry
/// ```
///
/// Carry is set if the remainder is non-zero.
#[inline]
pub fn div<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, a, b) = operands::<FORM>(s, o);
    let (v, flags) = alu::div16(a, b, s.flags)?;
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

/// Modulus, with the sign of the divisor
#[inline]
pub fn modulo<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, a, b) = operands::<FORM>(s, o);
    let (v, flags) = alu::mod16(a, b, s.flags)?;
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

/// Remainder, with the sign of the dividend
#[inline]
pub fn rem<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, a, b) = operands::<FORM>(s, o);
    let (v, flags) = alu::rem16(a, b, s.flags)?;
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Bitwise

macro_rules! op_logic {
    ($s:ident, $o:ident, $form:ident, $f:expr) => {{
        let (dst, a, b) = operands::<$form>($s, $o);
        let f: fn(i16, i16) -> i16 = $f;
        let (v, flags) = alu::logic16(f(a, b), $s.flags);
        $s.regs[dst] = v;
        $s.flags = flags;
    }};
}

/// Bitwise and
///
/// ```text
/// ANDI Rx, HHLL    Rx = Rx & HHLL
/// AND  Rx, Ry      Rx = Rx & Ry
/// AND  Rx, Ry, Rz  Rz = Rx & Ry
/// ```
#[inline]
pub fn and<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    op_logic!(s, o, FORM, |a, b| a & b);
    Ok(())
}

/// Test, i.e. bitwise and without storing the result
#[inline]
pub fn tst<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (_, a, b) = operands::<FORM>(s, o);
    s.flags.set_zero_and_negative(a & b);
    Ok(())
}

/// Bitwise or
#[inline]
pub fn or<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    op_logic!(s, o, FORM, |a, b| a | b);
    Ok(())
}

/// Bitwise exclusive or
#[inline]
pub fn xor<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    op_logic!(s, o, FORM, |a, b| a ^ b);
    Ok(())
}

/// Shift left
///
/// ```text
/// SHL Rx, N
/// SHL Rx, Ry
/// ```
#[inline]
pub fn shl<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    shift::<FORM>(s, o, alu::shl16)
}

/// Logical shift right
#[inline]
pub fn shr<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    shift::<FORM>(s, o, alu::shr16)
}

/// Arithmetic shift right, copying the sign bit
#[inline]
pub fn sar<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    shift::<FORM>(s, o, alu::sar16)
}

#[inline]
fn shift<const FORM: u8>(
    s: &mut State,
    o: Opcode,
    f: fn(i16, u16) -> i16,
) -> Result<(), Error> {
    let n = match FORM {
        IMM => u16::from(o.n()),
        _ => s.regs[o.y()] as u16,
    };
    let x = o.x();
    let v = f(s.regs[x], n);
    s.flags.set_zero_and_negative(v);
    s.regs[x] = v;
    Ok(())
}

/// Bitwise not
///
/// ```text
/// NOTI Rx, HHLL    Rx = !HHLL
/// NOT  Rx          Rx = !Rx
/// NOT  Rx, Ry      Rx = !Ry
/// ```
#[inline]
pub fn not<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, v) = operand::<FORM>(s, o);
    let (v, flags) = alu::logic16(!v, s.flags);
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

/// Arithmetic negation
///
/// ```text
/// NEGI Rx, HHLL    Rx = -HHLL
/// NEG  Rx          Rx = -Rx
/// NEG  Rx, Ry      Rx = -Ry
/// ```
///
/// Negating `-32768` gives `-32768`; overflow is not signalled.
#[inline]
pub fn neg<const FORM: u8>(s: &mut State, o: Opcode) -> Result<(), Error> {
    let (dst, v) = operand::<FORM>(s, o);
    let (v, flags) = alu::logic16(v.wrapping_neg(), s.flags);
    s.regs[dst] = v;
    s.flags = flags;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Stack

/// Push `Rx`
#[inline]
pub fn push(s: &mut State, o: Opcode) -> Result<(), Error> {
    let v = s.regs[o.x()];
    s.push(v)
}

/// Pop `Rx`
#[inline]
pub fn pop(s: &mut State, o: Opcode) -> Result<(), Error> {
    s.regs[o.x()] = s.pop()?;
    Ok(())
}

/// Push `R0` through `RF`
#[inline]
pub fn pushall(s: &mut State, _: Opcode) -> Result<(), Error> {
    s.reserve(32)?;
    for i in 0..s.regs.len() {
        let v = s.regs[i];
        s.push(v)?;
    }
    Ok(())
}

/// Pop `RF` through `R0`
#[inline]
pub fn popall(s: &mut State, _: Opcode) -> Result<(), Error> {
    s.release(32)?;
    for i in (0..s.regs.len()).rev() {
        s.regs[i] = s.pop()?;
    }
    Ok(())
}

/// Push flags
///
/// The flags byte is stored in the low byte of a stack word.
#[inline]
pub fn pushf(s: &mut State, _: Opcode) -> Result<(), Error> {
    let v = i16::from(s.flags.bits());
    s.push(v)
}

/// Pop flags
#[inline]
pub fn popf(s: &mut State, _: Opcode) -> Result<(), Error> {
    let v = s.pop()?;
    s.flags = crate::Flags::from_bits(v as u8);
    Ok(())
}
