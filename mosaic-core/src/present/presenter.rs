//! Presenter: tile runs to driver calls

use alloc::vec::Vec;

use mosaic_hal::WireFormat;

use super::stats::PresentStats;
use crate::config::PresenterConfig;
use crate::error::Error;
use crate::format::NativeFormat;
use crate::framebuffer::{try_alloc, PixelBuffer};
use crate::geometry::Window;
use crate::traits::PanelDriver;

/// Streams dirty framebuffer regions to a panel driver
///
/// Owns a scratch line of `capacity` RGB565 pixels that is reused for every
/// rectangle of every frame.
pub struct Presenter {
    /// Big-endian RGB565, two bytes per pixel
    line: Vec<u8>,
    capacity: usize,
    stats: PresentStats,
}

impl Presenter {
    /// Allocate a presenter converting up to `max_line_pixels` per transfer
    pub fn new(max_line_pixels: usize) -> Result<Self, Error> {
        if max_line_pixels == 0 {
            return Err(Error::InvalidArgument);
        }
        let bytes = max_line_pixels
            .checked_mul(WireFormat::Rgb565.byte_len(1))
            .ok_or(Error::OutOfMemory)?;
        let line = try_alloc(bytes, 0u8)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("presenter line: {} px", max_line_pixels);

        Ok(Self {
            line,
            capacity: max_line_pixels,
            stats: PresentStats::default(),
        })
    }

    pub fn from_config(config: &PresenterConfig) -> Result<Self, Error> {
        Self::new(config.max_line_pixels)
    }

    /// Scratch line size in pixels
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> &PresentStats {
        &self.stats
    }

    /// Zero the counters; tile state is untouched
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Send every dirty tile of `fb` to `driver`
    ///
    /// Adjacent dirty tiles in a tile row are merged into one window. Tiles
    /// are marked clean only after their whole window was sent. On a driver
    /// error the call stops immediately: windows already sent stay sent, the
    /// failing window and everything after it stay dirty for the next call.
    ///
    /// Fails with [`Error::Unsupported`] before touching anything when the
    /// driver cannot address windows.
    pub fn present_frame<D, F>(
        &mut self,
        driver: &mut D,
        fb: &mut PixelBuffer<F>,
    ) -> Result<(), Error<D::Error>>
    where
        D: PanelDriver,
        F: NativeFormat,
    {
        if !driver.capabilities().windowed {
            #[cfg(feature = "defmt")]
            defmt::warn!("present: driver has no windowed write path");
            return Err(Error::Unsupported);
        }
        self.stats.record_frame();

        for ty in 0..fb.tiles_y() {
            let mut from = 0;
            while let Some((start, end)) = fb.next_dirty_run(ty, from) {
                let window = fb.run_window(ty, start, end);
                if let Err(e) = self.push_window(driver, fb, window) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "present aborted at tile row {}, columns {}..{}",
                        ty,
                        start,
                        end
                    );
                    return Err(Error::Transport(e));
                }
                fb.clear_run(ty, start, end);
                self.stats.record_rect(window, end - start);

                #[cfg(feature = "defmt")]
                defmt::trace!(
                    "rect {}x{} at ({}, {})",
                    window.w,
                    window.h,
                    window.x,
                    window.y
                );

                from = end;
            }
        }
        Ok(())
    }

    /// Set the window, then stream it row by row in scratch-sized chunks
    fn push_window<D, F>(
        &mut self,
        driver: &mut D,
        fb: &PixelBuffer<F>,
        window: Window,
    ) -> Result<(), D::Error>
    where
        D: PanelDriver,
        F: NativeFormat,
    {
        driver.set_window(window)?;
        let chunk_bytes = self.capacity * F::BYTES_PER_PIXEL;
        for y in window.y..window.y + window.h {
            for src in fb.span(window.x, y, window.w).chunks(chunk_bytes) {
                let count = src.len() / F::BYTES_PER_PIXEL;
                let out = &mut self.line[..count * 2];
                for (px, wire) in src
                    .chunks_exact(F::BYTES_PER_PIXEL)
                    .zip(out.chunks_exact_mut(2))
                {
                    wire.copy_from_slice(&F::to_rgb565(px).to_be_bytes());
                }
                driver.write_pixels(out, count, WireFormat::Rgb565)?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Presenter")
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}
