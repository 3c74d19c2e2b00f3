//! Tile dirty tracking and content checksums

use super::PixelBuffer;
use crate::format::NativeFormat;
use crate::geometry::{Rect, Window};

/// Presentation state of one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TileState {
    /// Panel holds the current content
    #[default]
    Clean,
    /// Written since the last rehash; content may or may not differ
    Touched,
    /// Rehash confirmed the content differs from what was last recorded
    Changed,
}

impl TileState {
    /// Check if the tile must be sent on the next present
    pub const fn is_dirty(self) -> bool {
        !matches!(self, Self::Clean)
    }
}

/// Murmur3 finalizer
#[inline]
const fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

impl<F: NativeFormat> PixelBuffer<F> {
    /// Flag every tile intersecting the rectangle as touched
    ///
    /// The rectangle is clipped to the buffer; an empty or fully
    /// out-of-bounds rectangle changes nothing. Pixel data is not read.
    pub fn mark_dirty_pixels(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if let Some(win) = Rect::new(x, y, w, h).clip_to(self.bounds()) {
            self.mark_window(win);
        }
    }

    /// Recompute checksums of every tile intersecting the rectangle
    ///
    /// The recorded checksum is that of the last rehash or present, whichever
    /// came later. A tile whose checksum differs from it becomes
    /// [`TileState::Changed`]. A [`TileState::Touched`] tile whose content
    /// turns out identical goes back to clean. A tile already confirmed
    /// changed stays dirty until presented. The new checksum is stored in
    /// every case.
    pub fn rehash_tiles(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let Some(win) = Rect::new(x, y, w, h).clip_to(self.bounds()) else {
            return;
        };
        let (tx0, tx1, ty0, ty1) = self.tile_span(win);
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                let crc = self.compute_checksum(tx, ty);
                let i = self.index(tx, ty);
                self.states[i] = match (self.states[i], crc == self.checksums[i]) {
                    (_, false) => TileState::Changed,
                    (TileState::Touched, true) => TileState::Clean,
                    (state, true) => state,
                };
                self.checksums[i] = crc;
            }
        }
    }

    /// Flag every tile as touched, forcing a full repaint on the next present
    pub fn invalidate(&mut self) {
        for state in self.states.iter_mut() {
            if *state == TileState::Clean {
                *state = TileState::Touched;
            }
        }
    }

    pub(crate) fn mark_window(&mut self, win: Window) {
        let (tx0, tx1, ty0, ty1) = self.tile_span(win);
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                let i = self.index(tx, ty);
                if self.states[i] == TileState::Clean {
                    self.states[i] = TileState::Touched;
                }
            }
        }
    }

    /// Next run of dirty tiles in tile row `ty` at or after column `from`
    ///
    /// Returns the half-open column range `start..end`.
    pub(crate) fn next_dirty_run(&self, ty: u16, from: u16) -> Option<(u16, u16)> {
        let row = usize::from(ty) * usize::from(self.tiles_x);
        let is_dirty = |tx: u16| self.states[row + usize::from(tx)].is_dirty();

        let start = (from..self.tiles_x).find(|&tx| is_dirty(tx))?;
        let end = (start..self.tiles_x)
            .find(|&tx| !is_dirty(tx))
            .unwrap_or(self.tiles_x);
        Some((start, end))
    }

    /// Mark tiles `start..end` of tile row `ty` as presented
    ///
    /// The stored checksums are refreshed to the content just sent, so a
    /// later rehash compares against what the panel actually shows.
    pub(crate) fn clear_run(&mut self, ty: u16, start: u16, end: u16) {
        for tx in start..end {
            let i = self.index(tx, ty);
            self.checksums[i] = self.compute_checksum(tx, ty);
            self.states[i] = TileState::Clean;
        }
    }

    pub(super) fn seed_checksums(&mut self) {
        for ty in 0..self.tiles_y {
            for tx in 0..self.tiles_x {
                let i = self.index(tx, ty);
                self.checksums[i] = self.compute_checksum(tx, ty);
            }
        }
    }

    /// Inclusive tile column and row ranges covering `win`
    fn tile_span(&self, win: Window) -> (u16, u16, u16, u16) {
        let tw = u32::from(self.tile_width);
        let th = u32::from(self.tile_height);
        (
            (u32::from(win.x) / tw) as u16,
            ((win.right() - 1) / tw) as u16,
            (u32::from(win.y) / th) as u16,
            ((win.bottom() - 1) / th) as u16,
        )
    }

    fn index(&self, tx: u16, ty: u16) -> usize {
        usize::from(ty) * usize::from(self.tiles_x) + usize::from(tx)
    }

    /// Per-row CRC-32, mixed with the row number and XOR-folded
    ///
    /// Plain XOR of row CRCs cancels for identical row pairs, which would
    /// give every uniform tile with an even row count the same checksum.
    fn compute_checksum(&self, tx: u16, ty: u16) -> u32 {
        let win = self.run_window(ty, tx, tx + 1);
        (0..win.h).fold(0u32, |acc, row| {
            let crc = crc32fast::hash(self.span(win.x, win.y + row, win.w));
            acc ^ fmix32(crc ^ u32::from(row).wrapping_mul(0x9E37_79B9))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::format::{Rgb565, Rgba8888};

    fn fb() -> PixelBuffer<Rgb565> {
        PixelBuffer::new(64, 48, 16, 16).unwrap()
    }

    fn dirty_tiles(fb: &PixelBuffer<Rgb565>) -> alloc::vec::Vec<(u16, u16)> {
        let mut out = alloc::vec::Vec::new();
        for ty in 0..fb.tiles_y() {
            for tx in 0..fb.tiles_x() {
                if fb.is_tile_dirty(tx, ty) {
                    out.push((tx, ty));
                }
            }
        }
        out
    }

    #[test]
    fn test_mark_single_pixel() {
        let mut fb = fb();
        fb.mark_dirty_pixels(17, 33, 1, 1);
        assert_eq!(dirty_tiles(&fb), [(1, 2)]);
        assert_eq!(fb.tile_state(1, 2), Some(TileState::Touched));
    }

    #[test]
    fn test_mark_spanning_tile_boundary() {
        let mut fb = fb();
        fb.mark_dirty_pixels(15, 15, 2, 2);
        assert_eq!(dirty_tiles(&fb), [(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_mark_outside_changes_nothing() {
        let mut fb = fb();
        fb.mark_dirty_pixels(64, 0, 10, 10);
        fb.mark_dirty_pixels(-10, 0, 10, 10);
        fb.mark_dirty_pixels(0, 48, 10, 10);
        fb.mark_dirty_pixels(5, 5, 0, 10);
        fb.mark_dirty_pixels(5, 5, 10, -1);
        assert_eq!(fb.dirty_tile_count(), 0);
    }

    #[test]
    fn test_mark_partially_outside_is_clipped() {
        let mut fb = fb();
        fb.mark_dirty_pixels(-100, 40, 120, 100);
        assert_eq!(dirty_tiles(&fb), [(0, 2), (1, 2)]);
    }

    #[test]
    fn test_rehash_untouched_content_goes_clean() {
        let mut fb = fb();
        fb.mark_dirty_pixels(0, 0, 64, 48);
        assert_eq!(fb.dirty_tile_count(), 12);

        fb.rehash_tiles(0, 0, 64, 48);
        assert_eq!(fb.dirty_tile_count(), 0);

        fb.rehash_tiles(0, 0, 64, 48);
        assert_eq!(fb.dirty_tile_count(), 0);
    }

    #[test]
    fn test_rehash_detects_single_byte_change() {
        let mut fb = fb();
        let before = fb.tile_checksum(2, 1).unwrap();

        fb.span_mut(40, 20, 1)[1] ^= 0x01;
        fb.rehash_tiles(0, 0, 64, 48);

        assert_eq!(dirty_tiles(&fb), [(2, 1)]);
        assert_eq!(fb.tile_state(2, 1), Some(TileState::Changed));
        assert_ne!(fb.tile_checksum(2, 1), Some(before));
    }

    #[test]
    fn test_confirmed_change_survives_second_rehash() {
        let mut fb = fb();
        fb.fill_rect(0, 0, 8, 8, Rgba8::WHITE);
        fb.rehash_tiles(0, 0, 16, 16);
        assert_eq!(fb.tile_state(0, 0), Some(TileState::Changed));

        fb.rehash_tiles(0, 0, 16, 16);
        assert_eq!(fb.tile_state(0, 0), Some(TileState::Changed));
    }

    #[test]
    fn test_uniform_tiles_hash_by_color() {
        let mut fb = PixelBuffer::<Rgba8888>::new(32, 16, 16, 16).unwrap();
        fb.fill_rect(0, 0, 16, 16, Rgba8::WHITE);
        fb.fill_rect(16, 0, 16, 16, Rgba8::RED);
        fb.rehash_tiles(0, 0, 32, 16);
        assert_ne!(fb.tile_checksum(0, 0), fb.tile_checksum(1, 0));
    }

    #[test]
    fn test_redraw_same_content_suppressed_by_rehash() {
        let mut fb = fb();
        fb.fill_rect(0, 0, 64, 48, Rgba8::BLUE);
        fb.rehash_tiles(0, 0, 64, 48);
        fb.clear_run(0, 0, 4);
        fb.clear_run(1, 0, 4);
        fb.clear_run(2, 0, 4);

        // Same frame drawn again
        fb.fill_rect(0, 0, 64, 48, Rgba8::BLUE);
        assert_eq!(fb.dirty_tile_count(), 12);
        fb.rehash_tiles(0, 0, 64, 48);
        assert_eq!(fb.dirty_tile_count(), 0);
    }

    #[test]
    fn test_presented_content_becomes_reference() {
        let mut fb = fb();
        fb.fill_rect(0, 0, 16, 16, Rgba8::WHITE);
        fb.clear_run(0, 0, 1);

        // Back to the seeded content, which the panel no longer shows
        fb.fill_rect(0, 0, 16, 16, Rgba8::BLACK);
        fb.rehash_tiles(0, 0, 64, 48);
        assert_eq!(fb.tile_state(0, 0), Some(TileState::Changed));
    }

    #[test]
    fn test_clear_run_refreshes_checksum() {
        let mut fb = fb();
        let seeded = fb.tile_checksum(1, 0);
        fb.fill_rect(16, 0, 16, 16, Rgba8::RED);
        fb.clear_run(0, 1, 2);

        assert_ne!(fb.tile_checksum(1, 0), seeded);
        fb.mark_dirty_pixels(16, 0, 1, 1);
        fb.rehash_tiles(0, 0, 64, 48);
        assert_eq!(fb.dirty_tile_count(), 0);
    }

    #[test]
    fn test_dirty_runs() {
        let mut fb = fb();
        fb.mark_dirty_pixels(0, 0, 1, 1);
        fb.mark_dirty_pixels(32, 0, 32, 1);

        assert_eq!(fb.next_dirty_run(0, 0), Some((0, 1)));
        assert_eq!(fb.next_dirty_run(0, 1), Some((2, 4)));
        assert_eq!(fb.next_dirty_run(0, 4), None);
        assert_eq!(fb.next_dirty_run(1, 0), None);

        fb.clear_run(0, 2, 4);
        assert_eq!(fb.next_dirty_run(0, 1), None);
    }

    #[test]
    fn test_invalidate_marks_everything() {
        let mut fb = fb();
        fb.invalidate();
        assert_eq!(fb.dirty_tile_count(), 12);
    }
}
