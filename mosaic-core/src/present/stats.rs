//! Presenter transfer statistics

use crate::geometry::Window;

/// Bytes per pixel on the wire (RGB565)
const WIRE_BYTES_PER_PIXEL: u32 = 2;

/// Running transfer counters
///
/// Counters only grow (wrapping on overflow) until [`reset`](Self::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresentStats {
    /// `present_frame` calls that passed the capability check
    pub frames: u32,
    /// Coalesced rectangles sent
    pub rects_pushed: u32,
    /// Pixels converted and sent
    pub pixels_sent: u32,
    /// Bytes sent over the bus
    pub bytes_sent: u32,
    /// Dirty tiles cleared by successful sends
    pub tiles_dirty: u32,
}

impl PresentStats {
    /// Zero every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record_frame(&mut self) {
        self.frames = self.frames.wrapping_add(1);
    }

    pub(crate) fn record_rect(&mut self, window: Window, tiles: u16) {
        let pixels = window.area();
        self.rects_pushed = self.rects_pushed.wrapping_add(1);
        self.tiles_dirty = self.tiles_dirty.wrapping_add(u32::from(tiles));
        self.pixels_sent = self.pixels_sent.wrapping_add(pixels);
        self.bytes_sent = self
            .bytes_sent
            .wrapping_add(pixels.wrapping_mul(WIRE_BYTES_PER_PIXEL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let mut stats = PresentStats::default();
        stats.record_frame();
        stats.record_rect(Window::new(0, 0, 32, 16), 2);
        stats.record_rect(Window::new(0, 16, 16, 16), 1);

        assert_eq!(
            stats,
            PresentStats {
                frames: 1,
                rects_pushed: 2,
                pixels_sent: 768,
                bytes_sent: 1536,
                tiles_dirty: 3,
            }
        );

        stats.reset();
        assert_eq!(stats, PresentStats::default());
    }

    #[test]
    fn test_counters_wrap() {
        let mut stats = PresentStats {
            frames: u32::MAX,
            ..Default::default()
        };
        stats.record_frame();
        assert_eq!(stats.frames, 0);
    }
}
