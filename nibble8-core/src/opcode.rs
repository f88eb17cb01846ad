use std::fmt;

/// A raw 16-bit instruction word.
///
/// ```text
///  nibble:   1    2    3    4
///          +----+----+----+----+
///          |  c |  x |  y |  n |
///          +----+----+----+----+
///                    |   kk    |
///               |     nnn      |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Self(u16::from_be_bytes([high, low]))
    }

    /// Nibble at `position`, 1 being the most significant.
    ///
    /// # Panics
    ///
    /// If `position` is outside `1..=4`.
    pub fn nibble(self, position: u8) -> u8 {
        assert!(
            (1..=4).contains(&position),
            "nibble position must be 1..=4, got {position}"
        );
        ((self.0 >> ((4 - position) * 4)) & 0xF) as u8
    }

    pub fn x(self) -> u8 {
        self.nibble(2)
    }

    pub fn y(self) -> u8 {
        self.nibble(3)
    }

    pub fn n(self) -> u8 {
        self.nibble(4)
    }

    /// Last 8 bits.
    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Last 12 bits, an address operand.
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Self(word)
    }
}

impl fmt::LowerHex for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibbles_are_most_significant_first() {
        let opcode = Opcode(0xD12F);
        assert_eq!(opcode.nibble(1), 0xD);
        assert_eq!(opcode.nibble(2), 0x1);
        assert_eq!(opcode.nibble(3), 0x2);
        assert_eq!(opcode.nibble(4), 0xF);
        assert_eq!((opcode.x(), opcode.y(), opcode.n()), (0x1, 0x2, 0xF));
    }

    #[test]
    fn byte_and_address_operands() {
        let opcode = Opcode(0x73EE);
        assert_eq!(opcode.kk(), 0xEE);
        assert_eq!(opcode.nnn(), 0x3EE);
    }

    #[test]
    fn from_bytes_is_big_endian() {
        assert_eq!(Opcode::from_bytes(0xA2, 0x48), Opcode(0xA248));
    }

    #[test]
    fn formats_as_hex() {
        assert_eq!(format!("{:04X}", Opcode(0x00e0)), "00E0");
        assert_eq!(format!("{:#06x}", Opcode(0x8AB4)), "0x8ab4");
    }

    #[test]
    #[should_panic]
    fn nibble_zero_is_a_contract_violation() {
        Opcode(0x1234).nibble(0);
    }

    #[test]
    #[should_panic]
    fn nibble_five_is_a_contract_violation() {
        Opcode(0x1234).nibble(5);
    }
}
