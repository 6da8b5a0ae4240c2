//! Flag-setting arithmetic on signed 16-bit values
//!
//! Each function takes the current flags by value and returns the result
//! alongside the updated flags; bits that an operation doesn't define are
//! passed through untouched.
use crate::{Error, Flags};

/// Wrapping addition, setting all four flags
///
/// Carry is the unsigned overflow out of bit 15; overflow is the signed
/// overflow of the `i16` range.
#[inline]
pub fn add16(x: i16, y: i16, mut flags: Flags) -> (i16, Flags) {
    let (sum, carry) = (x as u16).overflowing_add(y as u16);
    let (_, overflow) = x.overflowing_add(y);
    let sum = sum as i16;
    flags.set_carry(carry);
    flags.set_overflow(overflow);
    flags.set_zero_and_negative(sum);
    (sum, flags)
}

/// Wrapping subtraction, setting all four flags
///
/// Carry is the unsigned borrow; overflow is the signed overflow of the `i16`
/// range.
#[inline]
pub fn sub16(x: i16, y: i16, mut flags: Flags) -> (i16, Flags) {
    let (diff, borrow) = (x as u16).overflowing_sub(y as u16);
    let (_, overflow) = x.overflowing_sub(y);
    let diff = diff as i16;
    flags.set_carry(borrow);
    flags.set_overflow(overflow);
    flags.set_zero_and_negative(diff);
    (diff, flags)
}

/// Truncating multiplication
///
/// Carry is set if the full 32-bit product doesn't fit in an `i16`.
/// Overflow is left alone.
#[inline]
pub fn mul16(x: i16, y: i16, mut flags: Flags) -> (i16, Flags) {
    let wide = i32::from(x) * i32::from(y);
    let res = wide as i16;
    flags.set_carry(i32::from(res) != wide);
    flags.set_zero_and_negative(res);
    (res, flags)
}

/// Division, rounding toward zero
///
/// Carry is set if the division is inexact.
#[inline]
pub fn div16(x: i16, y: i16, mut flags: Flags) -> Result<(i16, Flags), Error> {
    if y == 0 {
        return Err(Error::DivideByZero);
    }
    let res = x.wrapping_div(y);
    flags.set_carry(x.wrapping_rem(y) != 0);
    flags.set_zero_and_negative(res);
    Ok((res, flags))
}

/// Truncating remainder, whose sign follows the dividend
#[inline]
pub fn rem16(x: i16, y: i16, mut flags: Flags) -> Result<(i16, Flags), Error> {
    if y == 0 {
        return Err(Error::DivideByZero);
    }
    let res = x.wrapping_rem(y);
    flags.set_zero_and_negative(res);
    Ok((res, flags))
}

/// Floored modulus, whose sign follows the divisor
#[inline]
pub fn mod16(x: i16, y: i16, mut flags: Flags) -> Result<(i16, Flags), Error> {
    if y == 0 {
        return Err(Error::DivideByZero);
    }
    let mut res = x.wrapping_rem(y);
    if res != 0 && (res < 0) != (y < 0) {
        res += y;
    }
    flags.set_zero_and_negative(res);
    Ok((res, flags))
}

/// Applies a bitwise or unary operation, setting only zero and negative
#[inline]
pub fn logic16(res: i16, mut flags: Flags) -> (i16, Flags) {
    flags.set_zero_and_negative(res);
    (res, flags)
}

/// Logical shift left; only the low 4 bits of `n` are used
#[inline]
pub fn shl16(x: i16, n: u16) -> i16 {
    x.wrapping_shl(u32::from(n & 0xF))
}

/// Logical shift right; only the low 4 bits of `n` are used
#[inline]
pub fn shr16(x: i16, n: u16) -> i16 {
    (x as u16).wrapping_shr(u32::from(n & 0xF)) as i16
}

/// Arithmetic shift right; only the low 4 bits of `n` are used
#[inline]
pub fn sar16(x: i16, n: u16) -> i16 {
    x.wrapping_shr(u32::from(n & 0xF))
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    /// `(x, y, result, carry, overflow, negative, zero)`
    type Case = (i16, i16, i16, bool, bool, bool, bool);

    fn check(
        name: &str,
        cases: &[Case],
        f: impl Fn(i16, i16, Flags) -> (i16, Flags),
    ) {
        for &(x, y, exp, c, o, n, z) in cases {
            let (res, flags) = f(x, y, Flags::default());
            assert_eq!(res, exp, "{x} {name} {y}");
            assert_eq!(flags.carry(), c, "{x} {name} {y}: carry");
            assert_eq!(flags.overflow(), o, "{x} {name} {y}: overflow");
            assert_eq!(flags.negative(), n, "{x} {name} {y}: negative");
            assert_eq!(flags.zero(), z, "{x} {name} {y}: zero");
        }
    }

    #[test]
    fn add() {
        check(
            "+",
            &[
                (1, 2, 3, false, false, false, false),
                (0, 0, 0, false, false, false, true),
                (-1, 1, 0, true, false, false, true),
                (0x7FFF, 1, i16::MIN, false, true, true, false),
                (i16::MIN, -1, i16::MAX, true, true, false, false),
                (-2, -3, -5, true, false, true, false),
            ],
            add16,
        );
    }

    #[test]
    fn sub() {
        check(
            "-",
            &[
                (3, 2, 1, false, false, false, false),
                (2, 2, 0, false, false, false, true),
                (2, 3, -1, true, false, true, false),
                (i16::MIN, 1, i16::MAX, false, true, false, false),
                (i16::MAX, -1, i16::MIN, true, true, true, false),
                (-1, -1, 0, false, false, false, true),
            ],
            sub16,
        );
    }

    #[test]
    fn mul() {
        check(
            "*",
            &[
                (3, 4, 12, false, false, false, false),
                (0, 1000, 0, false, false, false, true),
                (-3, 4, -12, false, false, true, false),
                (0x100, 0x100, 0, true, false, false, true),
                (0x4000, 2, i16::MIN, true, false, true, false),
                (-0x4000, 2, i16::MIN, false, false, true, false),
            ],
            mul16,
        );
    }

    #[test]
    fn mul_keeps_overflow() {
        let mut f = Flags::default();
        f.set_overflow(true);
        let (_, f) = mul16(2, 3, f);
        assert!(f.overflow());
    }

    #[test]
    fn div() {
        let div = |x, y, f| div16(x, y, f).unwrap();
        check(
            "/",
            &[
                (12, 4, 3, false, false, false, false),
                (13, 4, 3, true, false, false, false),
                (-13, 4, -3, true, false, true, false),
                (3, 4, 0, true, false, false, true),
                (i16::MIN, -1, i16::MIN, false, false, true, false),
            ],
            div,
        );
    }

    #[test]
    fn rem_and_mod() {
        let rem = |x, y, f| rem16(x, y, f).unwrap();
        check(
            "%",
            &[
                (7, 3, 1, false, false, false, false),
                (-7, 3, -1, false, false, true, false),
                (7, -3, 1, false, false, false, false),
                (6, 3, 0, false, false, false, true),
            ],
            rem,
        );
        let modulo = |x, y, f| mod16(x, y, f).unwrap();
        check(
            "mod",
            &[
                (7, 3, 1, false, false, false, false),
                (-7, 3, 2, false, false, false, false),
                (7, -3, -2, false, false, true, false),
                (-7, -3, -1, false, false, true, false),
                (-6, 3, 0, false, false, false, true),
            ],
            modulo,
        );
    }

    #[test]
    fn remainders_keep_carry_and_overflow() {
        let f = Flags::from_bits(Flags::CARRY | Flags::OVERFLOW);
        for (_, g) in [rem16(-7, 3, f).unwrap(), mod16(-7, 3, f).unwrap()] {
            assert!(g.carry() && g.overflow());
        }
    }

    #[test]
    fn shifts() {
        assert_eq!(shl16(1, 2), 4);
        assert_eq!(shl16(0x7FFF, 2), -4);
        assert_eq!(shr16(i16::MIN, 15), 1);
        assert_eq!(sar16(i16::MIN, 15), -1);
        assert_eq!(shl16(1, 16), 1);
        assert_eq!(shr16(-1, 0x14), 0x0FFF);
    }

    proptest! {
        #[test]
        fn add_flags(x in any::<i16>(), y in any::<i16>()) {
            let (res, f) = add16(x, y, Flags::default());
            prop_assert_eq!(res, x.wrapping_add(y));
            prop_assert_eq!(
                f.carry(),
                u32::from(x as u16) + u32::from(y as u16) > 0xFFFF
            );
            prop_assert_eq!(
                f.overflow(),
                (x < 0) == (y < 0) && (res < 0) != (x < 0)
            );
            prop_assert_eq!(f.negative(), res < 0);
            prop_assert_eq!(f.zero(), res == 0);
        }

        #[test]
        fn sub_flags(x in any::<i16>(), y in any::<i16>()) {
            let (res, f) = sub16(x, y, Flags::default());
            prop_assert_eq!(res, x.wrapping_sub(y));
            prop_assert_eq!(f.carry(), (x as u16) < (y as u16));
            prop_assert_eq!(
                f.overflow(),
                i32::from(x) - i32::from(y) != i32::from(res)
            );
        }

        #[test]
        fn remainder_signs(x in any::<i16>(), y in any::<i16>()) {
            prop_assume!(y != 0);
            let (m, _) = mod16(x, y, Flags::default()).unwrap();
            prop_assert!(m == 0 || (m < 0) == (y < 0));
            let (r, _) = rem16(x, y, Flags::default()).unwrap();
            prop_assert!(r == 0 || (r < 0) == (x < 0));
        }

        #[test]
        fn divide_by_zero(x in any::<i16>()) {
            let f = Flags::default();
            prop_assert_eq!(div16(x, 0, f), Err(Error::DivideByZero));
            prop_assert_eq!(mod16(x, 0, f), Err(Error::DivideByZero));
            prop_assert_eq!(rem16(x, 0, f), Err(Error::DivideByZero));
        }
    }
}
