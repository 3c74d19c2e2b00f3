//! Colors and RGB565 packing
//!
//! RGB565 is the interchange format between the core and every panel
//! driver. Packing truncates to the top 5/6/5 bits; unpacking replicates the
//! high bits into the low ones, so `pack(unpack(p)) == p` for every `p`.

/// 8-bit-per-channel color with straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a color from all four channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Pack to RGB565, dropping alpha
    pub const fn to_rgb565(self) -> u16 {
        pack_rgb565(self.r, self.g, self.b)
    }

    /// Expand an RGB565 value to an opaque color
    pub const fn from_rgb565(packed: u16) -> Self {
        let (r, g, b) = unpack_rgb565(packed);
        Self::rgb(r, g, b)
    }
}

/// Pack 8-bit channels into RGB565
pub const fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | ((b >> 3) as u16)
}

/// Unpack RGB565 into 8-bit channels with bit replication
pub const fn unpack_rgb565(packed: u16) -> (u8, u8, u8) {
    let r = ((packed >> 8) & 0xF8) as u8;
    let g = ((packed >> 3) & 0xFC) as u8;
    let b5 = (packed & 0x1F) as u8;
    (r | (r >> 5), g | (g >> 6), (b5 << 3) | (b5 >> 2))
}

/// `x / 255` rounded to nearest, exact for `x <= 255 * 255`
#[inline]
pub(crate) const fn div255(x: u32) -> u32 {
    let x = x + 128;
    (x + (x >> 8)) >> 8
}

/// Scale `value` by `alpha / 255`, rounded
#[inline]
pub(crate) const fn mul_u8(value: u8, alpha: u8) -> u8 {
    div255(value as u32 * alpha as u32) as u8
}

/// Blend one channel: `alpha * src + (255 - alpha) * dst`, normalised
#[inline]
pub(crate) const fn lerp_u8(dst: u8, src: u8, alpha: u8) -> u8 {
    let inv = 255 - alpha as u32;
    div255(alpha as u32 * src as u32 + inv * dst as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_primaries() {
        assert_eq!(Rgba8::WHITE.to_rgb565(), 0xFFFF);
        assert_eq!(Rgba8::BLACK.to_rgb565(), 0x0000);
        assert_eq!(Rgba8::RED.to_rgb565(), 0xF800);
        assert_eq!(Rgba8::GREEN.to_rgb565(), 0x07E0);
        assert_eq!(Rgba8::BLUE.to_rgb565(), 0x001F);
    }

    #[test]
    fn test_unpack_replicates_high_bits() {
        assert_eq!(unpack_rgb565(0xFFFF), (255, 255, 255));
        assert_eq!(unpack_rgb565(0x0000), (0, 0, 0));
        // r5 = 0b10000 -> 0b10000_100
        assert_eq!(unpack_rgb565(0x8000).0, 0b1000_0100);
        // g6 = 0b100000 -> 0b100000_10
        assert_eq!(unpack_rgb565(0x0400).1, 0b1000_0010);
    }

    #[test]
    fn test_pack_ignores_alpha() {
        assert_eq!(
            Rgba8::new(10, 20, 30, 0).to_rgb565(),
            Rgba8::rgb(10, 20, 30).to_rgb565()
        );
    }

    #[test]
    fn test_div255_exact() {
        for x in 0..=(255u32 * 255) {
            let expected = (x * 2 + 255) / 510;
            assert_eq!(div255(x), expected, "x = {x}");
        }
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_u8(10, 200, 255), 200);
        assert_eq!(lerp_u8(10, 200, 0), 10);
        assert_eq!(mul_u8(255, 255), 255);
        assert_eq!(mul_u8(255, 0), 0);
    }
}
