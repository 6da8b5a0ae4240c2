use core::fmt;

/// A single 4-byte instruction word
///
/// The word is stored big-endian, i.e. the first byte in memory is the most
/// significant byte:
///
/// ```text
/// OP YX LL HH
/// ```
///
/// The 16-bit immediate is `HHLL`, so its bytes appear swapped in memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Opcode(u32);

impl Opcode {
    /// Builds an opcode from a raw instruction word
    #[inline]
    pub const fn new(word: u32) -> Self {
        Self(word)
    }

    /// Decodes an opcode from 4 bytes in memory order
    #[inline]
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    /// Returns the raw instruction word
    #[inline]
    pub const fn word(self) -> u32 {
        self.0
    }

    /// Operation code (leading byte)
    ///
    /// ```text
    /// OP YX LL HH
    /// ^^
    /// ```
    #[inline]
    pub const fn op(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// X register index
    ///
    /// ```text
    /// OP YX LL HH
    ///     ^
    /// ```
    #[inline]
    pub const fn x(self) -> usize {
        ((self.0 >> 16) & 0xF) as usize
    }

    /// Y register index
    ///
    /// ```text
    /// OP YX LL HH
    ///    ^
    /// ```
    #[inline]
    pub const fn y(self) -> usize {
        ((self.0 >> 20) & 0xF) as usize
    }

    /// Z register index
    ///
    /// ```text
    /// OP YX 0Z 00
    ///        ^
    /// ```
    #[inline]
    pub const fn z(self) -> usize {
        ((self.0 >> 8) & 0xF) as usize
    }

    /// N nibble, sharing its position with [`Opcode::z`]
    #[inline]
    pub const fn n(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    /// Low byte of the immediate
    #[inline]
    pub const fn ll(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// High byte of the immediate
    #[inline]
    pub const fn hh(self) -> u8 {
        self.0 as u8
    }

    /// 16-bit immediate
    ///
    /// ```text
    /// OP YX LL HH
    ///       ^^^^^
    /// ```
    #[inline]
    pub const fn hhll(self) -> u16 {
        u16::from_le_bytes([self.ll(), self.hh()])
    }

    /// Returns a copy of this opcode with the immediate replaced
    ///
    /// `OP` and `YX` are preserved.
    #[inline]
    pub const fn with_hhll(self, hhll: u16) -> Self {
        let [lo, hi] = hhll.to_le_bytes();
        Self((self.0 & 0xFFFF_0000) | ((lo as u32) << 8) | hi as u32)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.word())
    }
}
