use crate::Error;

/// CPU status flags, packed into a single byte
///
/// Only four bits are defined; the layout matches what `PUSHF` writes to the
/// stack.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    /// Carry (unsigned overflow, borrow, inexact division, sprite collision)
    pub const CARRY: u8 = 1 << 1;
    /// Zero result
    pub const ZERO: u8 = 1 << 2;
    /// Signed overflow
    pub const OVERFLOW: u8 = 1 << 6;
    /// Negative result
    pub const NEGATIVE: u8 = 1 << 7;

    const ALL: u8 = Self::CARRY | Self::ZERO | Self::OVERFLOW | Self::NEGATIVE;

    /// Builds a flags value from a raw byte, discarding undefined bits
    #[inline]
    pub const fn from_bits(b: u8) -> Self {
        Self(b & Self::ALL)
    }

    /// Returns the raw flags byte
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    fn set(&mut self, mask: u8, p: bool) {
        if p {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    /// Sets or clears the carry flag
    #[inline]
    pub fn set_carry(&mut self, p: bool) {
        self.set(Self::CARRY, p)
    }

    /// Sets or clears the zero flag
    #[inline]
    pub fn set_zero(&mut self, p: bool) {
        self.set(Self::ZERO, p)
    }

    /// Sets or clears the overflow flag
    #[inline]
    pub fn set_overflow(&mut self, p: bool) {
        self.set(Self::OVERFLOW, p)
    }

    /// Sets or clears the negative flag
    #[inline]
    pub fn set_negative(&mut self, p: bool) {
        self.set(Self::NEGATIVE, p)
    }

    /// Sets zero and negative from a result, leaving carry and overflow alone
    #[inline]
    pub fn set_zero_and_negative(&mut self, v: i16) {
        self.set_zero(v == 0);
        self.set_negative(v < 0);
    }

    /// Checks the carry flag
    #[inline]
    pub const fn carry(self) -> bool {
        self.0 & Self::CARRY != 0
    }

    /// Checks the zero flag
    #[inline]
    pub const fn zero(self) -> bool {
        self.0 & Self::ZERO != 0
    }

    /// Checks the overflow flag
    #[inline]
    pub const fn overflow(self) -> bool {
        self.0 & Self::OVERFLOW != 0
    }

    /// Checks the negative flag
    #[inline]
    pub const fn negative(self) -> bool {
        self.0 & Self::NEGATIVE != 0
    }

    /// Evaluates the condition with the given index
    ///
    /// Valid indices are `0x0..=0xE`; anything else returns
    /// [`Error::UnknownCondition`].
    pub fn condition(self, index: u8) -> Result<bool, Error> {
        Condition::try_from(index).map(|c| self.test(c))
    }

    /// Evaluates a decoded condition
    pub fn test(self, c: Condition) -> bool {
        let (z, n, o, carry) =
            (self.zero(), self.negative(), self.overflow(), self.carry());
        match c {
            Condition::Equal => z,
            Condition::NotEqual => !z,
            Condition::Negative => n,
            Condition::NonNegative => !n,
            Condition::Positive => !n && !z,
            Condition::Overflow => o,
            Condition::NoOverflow => !o,
            Condition::Above => !carry && !z,
            Condition::AboveEqual => !carry,
            Condition::Below => carry,
            Condition::BelowEqual => carry || z,
            Condition::Greater => o == n && !z,
            Condition::GreaterEqual => o == n,
            Condition::Less => o != n,
            Condition::LessEqual => o != n || z,
        }
    }
}

/// Condition codes used by `Jx` and `Cx`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Condition {
    /// `Z` (also `EQ`)
    Equal = 0x0,
    /// `NZ` (also `NE`)
    NotEqual = 0x1,
    /// `N`
    Negative = 0x2,
    /// `NN`
    NonNegative = 0x3,
    /// `P`
    Positive = 0x4,
    /// `O`
    Overflow = 0x5,
    /// `NO`
    NoOverflow = 0x6,
    /// `A`, unsigned greater than
    Above = 0x7,
    /// `AE` (also `NC`), unsigned greater than or equal
    AboveEqual = 0x8,
    /// `B` (also `C`), unsigned less than
    Below = 0x9,
    /// `BE`, unsigned less than or equal
    BelowEqual = 0xA,
    /// `G`, signed greater than
    Greater = 0xB,
    /// `GE`, signed greater than or equal
    GreaterEqual = 0xC,
    /// `L`, signed less than
    Less = 0xD,
    /// `LE`, signed less than or equal
    LessEqual = 0xE,
}

impl TryFrom<u8> for Condition {
    type Error = Error;
    fn try_from(i: u8) -> Result<Self, Error> {
        let c = match i {
            0x0 => Condition::Equal,
            0x1 => Condition::NotEqual,
            0x2 => Condition::Negative,
            0x3 => Condition::NonNegative,
            0x4 => Condition::Positive,
            0x5 => Condition::Overflow,
            0x6 => Condition::NoOverflow,
            0x7 => Condition::Above,
            0x8 => Condition::AboveEqual,
            0x9 => Condition::Below,
            0xA => Condition::BelowEqual,
            0xB => Condition::Greater,
            0xC => Condition::GreaterEqual,
            0xD => Condition::Less,
            0xE => Condition::LessEqual,
            _ => return Err(Error::UnknownCondition(i)),
        };
        Ok(c)
    }
}
