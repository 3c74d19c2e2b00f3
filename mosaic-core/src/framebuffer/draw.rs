//! Clipped drawing into the pixel buffer
//!
//! Every primitive clips to the buffer, writes pixels, then marks exactly the
//! written footprint dirty. Lines, points and outlines go through
//! [`PixelBuffer::fill_rect`].

use super::PixelBuffer;
use crate::color::{mul_u8, Rgba8};
use crate::error::Error;
use crate::format::NativeFormat;
use crate::geometry::Rect;

/// Single-channel coverage mask, e.g. a rasterised glyph
#[derive(Debug, Clone, Copy)]
pub struct AlphaMask<'a> {
    data: &'a [u8],
    width: u16,
    height: u16,
    pitch: usize,
}

impl<'a> AlphaMask<'a> {
    /// Wrap `height` rows of `width` coverage bytes, rows `pitch` bytes apart
    ///
    /// Fails when `pitch < width` or `data` is too short for the last row.
    pub fn new(data: &'a [u8], width: u16, height: u16, pitch: usize) -> Result<Self, Error> {
        if pitch < usize::from(width) {
            return Err(Error::InvalidArgument);
        }
        if height > 0 {
            let needed = pitch
                .checked_mul(usize::from(height) - 1)
                .and_then(|n| n.checked_add(usize::from(width)))
                .ok_or(Error::InvalidArgument)?;
            if data.len() < needed {
                return Err(Error::InvalidArgument);
            }
        }
        Ok(Self {
            data,
            width,
            height,
            pitch,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn row(&self, y: usize, x: usize, len: usize) -> &[u8] {
        let start = y * self.pitch + x;
        &self.data[start..start + len]
    }
}

/// Per-mille coordinate to pixels, rounded
fn permille(pm: i32, size: u16) -> i32 {
    let px = (i64::from(pm) * i64::from(size) + 500) / 1000;
    px.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl<F: NativeFormat> PixelBuffer<F> {
    /// Fill a rectangle with `color`
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba8) {
        let Some(win) = Rect::new(x, y, w, h).clip_to(self.bounds()) else {
            return;
        };
        for row in win.y..win.y + win.h {
            F::fill(self.span_mut(win.x, row, win.w), color);
        }
        self.mark_window(win);
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba8) {
        self.fill_rect(x, y, 1, 1, color);
    }

    pub fn fast_hline(&mut self, x: i32, y: i32, w: i32, color: Rgba8) {
        self.fill_rect(x, y, w, 1, color);
    }

    pub fn fast_vline(&mut self, x: i32, y: i32, h: i32, color: Rgba8) {
        self.fill_rect(x, y, 1, h, color);
    }

    /// One-pixel rectangle outline
    pub fn draw_rect_outline(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba8) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.fast_hline(x, y, w, color);
        self.fast_hline(x, y.saturating_add(h - 1), w, color);
        self.fast_vline(x, y.saturating_add(1), h - 2, color);
        self.fast_vline(x.saturating_add(w - 1), y.saturating_add(1), h - 2, color);
    }

    /// Fill the whole buffer
    pub fn clear(&mut self, color: Rgba8) {
        self.fill_rect(0, 0, i32::from(self.width), i32::from(self.height), color);
    }

    /// Fill a rectangle given in thousandths of the buffer size
    ///
    /// `(0, 0, 1000, 1000)` covers the whole buffer at any resolution.
    pub fn fill_rect_permille(&mut self, xpm: i32, ypm: i32, wpm: i32, hpm: i32, color: Rgba8) {
        self.fill_rect(
            permille(xpm, self.width),
            permille(ypm, self.height),
            permille(wpm, self.width),
            permille(hpm, self.height),
            color,
        );
    }

    /// Composite `color` through a coverage mask with its top-left at (`x`, `y`)
    ///
    /// Effective alpha per pixel is `coverage * color.a / 255`. The mask is
    /// clipped like [`fill_rect`](Self::fill_rect) and the clipped footprint
    /// is marked dirty even where coverage is zero.
    pub fn blend_alpha8(&mut self, x: i32, y: i32, mask: &AlphaMask<'_>, color: Rgba8) {
        let rect = Rect::new(x, y, i32::from(mask.width), i32::from(mask.height));
        let Some(win) = rect.clip_to(self.bounds()) else {
            return;
        };
        // Offset of the visible part inside the mask
        let ox = (i64::from(win.x) - i64::from(x)) as usize;
        let oy = (i64::from(win.y) - i64::from(y)) as usize;

        for j in 0..win.h {
            let src = mask.row(oy + usize::from(j), ox, usize::from(win.w));
            let dst = self.span_mut(win.x, win.y + j, win.w);
            for (&coverage, px) in src.iter().zip(dst.chunks_exact_mut(F::BYTES_PER_PIXEL)) {
                if coverage != 0 {
                    F::blend(px, color, mul_u8(coverage, color.a));
                }
            }
        }
        self.mark_window(win);
    }

    /// Read one pixel back, `None` outside the buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        let x = u16::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u16::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(F::load(self.span(x, y, 1)))
    }
}
