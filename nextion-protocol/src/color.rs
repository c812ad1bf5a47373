//! 16-bit colors as the display stores them
//!
//! ```text
//! MSB 11111 000000 11111 LSB
//!      Red  Green  Blue
//! ```

/// Packed RGB565 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0b0000_0000_0000_0000);
    pub const BLUE: Self = Self(0b0000_0000_0001_1111);
    pub const GREEN: Self = Self(0b0000_0111_1110_0000);
    pub const GRAY: Self = Self(0b1000_0100_0011_0000);
    pub const BROWN: Self = Self(0b1011_1100_0100_0000);
    pub const RED: Self = Self(0b1111_1000_0000_0000);
    pub const YELLOW: Self = Self(0b1111_1111_1110_0000);
    pub const WHITE: Self = Self(0b1111_1111_1111_1111);

    /// Convert from 8 bits per channel, dropping the low bits of each
    pub const fn from_rgb888(red: u8, green: u8, blue: u8) -> Self {
        let r = (red as u16 >> 3) << 11;
        let g = (green as u16 >> 2) << 5;
        let b = blue as u16 >> 3;
        Self(r | g | b)
    }

    /// Raw 16-bit value, as sent in numeric color attributes
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<Rgb565> for u16 {
    fn from(color: Rgb565) -> Self {
        color.0
    }
}
