//! Native (in-memory) pixel formats
//!
//! A [`PixelBuffer`](crate::PixelBuffer) is generic over exactly one
//! [`NativeFormat`]. The format decides how a color is laid out in the
//! buffer's bytes and how it converts to the RGB565 wire format.

use crate::color::{lerp_u8, pack_rgb565, unpack_rgb565, Rgba8};

/// In-memory pixel encoding
///
/// All methods take a slice of exactly `BYTES_PER_PIXEL` bytes for a single
/// pixel, except [`fill`](NativeFormat::fill) which takes a whole span.
pub trait NativeFormat {
    /// Bytes per stored pixel
    const BYTES_PER_PIXEL: usize;

    /// Encode `color` into one pixel
    fn store(color: Rgba8, dst: &mut [u8]);

    /// Decode one pixel
    fn load(src: &[u8]) -> Rgba8;

    /// Convert one pixel to the RGB565 wire value
    fn to_rgb565(src: &[u8]) -> u16;

    /// Composite `color` over one pixel with coverage-adjusted `alpha`
    fn blend(dst: &mut [u8], color: Rgba8, alpha: u8);

    /// Encode `color` into every pixel of `span`
    fn fill(span: &mut [u8], color: Rgba8) {
        if span.len() < Self::BYTES_PER_PIXEL {
            return;
        }
        let (first, rest) = span.split_at_mut(Self::BYTES_PER_PIXEL);
        Self::store(color, first);
        for px in rest.chunks_exact_mut(Self::BYTES_PER_PIXEL) {
            px.copy_from_slice(first);
        }
    }
}

/// 16-bit RGB565, stored as a little-endian `u16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb565;

impl NativeFormat for Rgb565 {
    const BYTES_PER_PIXEL: usize = 2;

    fn store(color: Rgba8, dst: &mut [u8]) {
        dst.copy_from_slice(&color.to_rgb565().to_le_bytes());
    }

    fn load(src: &[u8]) -> Rgba8 {
        Rgba8::from_rgb565(Self::to_rgb565(src))
    }

    #[inline]
    fn to_rgb565(src: &[u8]) -> u16 {
        u16::from_le_bytes([src[0], src[1]])
    }

    fn blend(dst: &mut [u8], color: Rgba8, alpha: u8) {
        match alpha {
            0 => {}
            255 => Self::store(color, dst),
            a => {
                let (dr, dg, db) = unpack_rgb565(Self::to_rgb565(dst));
                let packed = pack_rgb565(
                    lerp_u8(dr, color.r, a),
                    lerp_u8(dg, color.g, a),
                    lerp_u8(db, color.b, a),
                );
                dst.copy_from_slice(&packed.to_le_bytes());
            }
        }
    }
}

/// 32-bit RGBA, one byte per channel in `r, g, b, a` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgba8888;

impl NativeFormat for Rgba8888 {
    const BYTES_PER_PIXEL: usize = 4;

    fn store(color: Rgba8, dst: &mut [u8]) {
        dst.copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    fn load(src: &[u8]) -> Rgba8 {
        Rgba8::new(src[0], src[1], src[2], src[3])
    }

    #[inline]
    fn to_rgb565(src: &[u8]) -> u16 {
        pack_rgb565(src[0], src[1], src[2])
    }

    fn blend(dst: &mut [u8], color: Rgba8, alpha: u8) {
        if alpha == 0 {
            return;
        }
        dst[0] = lerp_u8(dst[0], color.r, alpha);
        dst[1] = lerp_u8(dst[1], color.g, alpha);
        dst[2] = lerp_u8(dst[2], color.b, alpha);
        dst[3] = lerp_u8(dst[3], 255, alpha);
    }
}
