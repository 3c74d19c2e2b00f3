//! Rectangles and clipping
//!
//! Drawing calls take signed [`Rect`]s that may hang off any edge. Everything
//! that touches memory or a panel works on [`Window`]s, which are clipped and
//! non-empty by construction.

/// Signed rectangle, possibly partly or fully off-surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Non-empty rectangle inside a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Intersect with `bounds`
    ///
    /// Negative origins shrink the extent, overflow past the far edge is
    /// truncated. Returns `None` for an empty result, including any input
    /// with non-positive width or height.
    pub fn clip_to(&self, bounds: Window) -> Option<Window> {
        if self.w <= 0 || self.h <= 0 {
            return None;
        }
        let x0 = i64::from(self.x).max(i64::from(bounds.x));
        let y0 = i64::from(self.y).max(i64::from(bounds.y));
        let x1 = (i64::from(self.x) + i64::from(self.w)).min(i64::from(bounds.right()));
        let y1 = (i64::from(self.y) + i64::from(self.h)).min(i64::from(bounds.bottom()));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        // Every coordinate now lies inside `bounds`, so it fits in u16
        Some(Window {
            x: x0 as u16,
            y: y0 as u16,
            w: (x1 - x0) as u16,
            h: (y1 - y0) as u16,
        })
    }
}

impl Window {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Window covering a whole `width` x `height` surface
    pub const fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// One past the right-most column
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.w as u32
    }

    /// One past the bottom-most row
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.h as u32
    }

    /// Pixel count
    pub const fn area(&self) -> u32 {
        self.w as u32 * self.h as u32
    }

    /// Intersect two windows
    pub fn intersect(&self, other: Window) -> Option<Window> {
        Rect::from(*self).clip_to(other)
    }
}

impl From<Window> for Rect {
    fn from(w: Window) -> Self {
        Rect::new(i32::from(w.x), i32::from(w.y), i32::from(w.w), i32::from(w.h))
    }
}
