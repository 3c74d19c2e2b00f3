//! Off-screen pixel buffer with per-tile change tracking
//!
//! The buffer is split into a grid of `tile_width` x `tile_height` tiles
//! (edge tiles may be smaller). Each tile carries a [`TileState`] and the
//! checksum of its content at the last rehash. Drawing marks tiles dirty;
//! the [`Presenter`](crate::Presenter) sends dirty tiles and marks them
//! clean again.

mod draw;
mod tiles;

use alloc::vec::Vec;
use core::marker::PhantomData;

pub use draw::AlphaMask;
pub use tiles::TileState;

use crate::config::FramebufferConfig;
use crate::error::Error;
use crate::format::{NativeFormat, Rgb565};
use crate::geometry::Window;

/// Allocate `len` copies of `value`, reporting failure instead of aborting
pub(crate) fn try_alloc<T: Clone>(len: usize, value: T) -> Result<Vec<T>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
    v.resize(len, value);
    Ok(v)
}

/// Framebuffer in native format `F` plus its tile grid
///
/// All storage is allocated by [`new`](Self::new) in one go and released
/// together on drop. There is no resize; build a new buffer instead.
pub struct PixelBuffer<F: NativeFormat = Rgb565> {
    width: u16,
    height: u16,
    stride: usize,
    pixels: Vec<u8>,
    tile_width: u16,
    tile_height: u16,
    tiles_x: u16,
    tiles_y: u16,
    checksums: Vec<u32>,
    states: Vec<TileState>,
    _format: PhantomData<F>,
}

impl<F: NativeFormat> PixelBuffer<F> {
    /// Allocate a zeroed `width` x `height` buffer with the given tile size
    ///
    /// All tiles start clean, with checksums of the zeroed content.
    pub fn new(width: u16, height: u16, tile_width: u16, tile_height: u16) -> Result<Self, Error> {
        if width == 0 || height == 0 || tile_width == 0 || tile_height == 0 {
            return Err(Error::InvalidArgument);
        }

        let stride = usize::from(width)
            .checked_mul(F::BYTES_PER_PIXEL)
            .ok_or(Error::OutOfMemory)?;
        let len = stride
            .checked_mul(usize::from(height))
            .ok_or(Error::OutOfMemory)?;
        let tiles_x = width.div_ceil(tile_width);
        let tiles_y = height.div_ceil(tile_height);
        let tile_count = usize::from(tiles_x) * usize::from(tiles_y);

        // A failure below drops whatever was already allocated
        let pixels = try_alloc(len, 0u8)?;
        let checksums = try_alloc(tile_count, 0u32)?;
        let states = try_alloc(tile_count, TileState::Clean)?;

        let mut fb = Self {
            width,
            height,
            stride,
            pixels,
            tile_width,
            tile_height,
            tiles_x,
            tiles_y,
            checksums,
            states,
            _format: PhantomData,
        };
        fb.seed_checksums();

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "framebuffer {}x{} ({} B), {}x{} tiles of {}x{}",
            width,
            height,
            len,
            tiles_x,
            tiles_y,
            tile_width,
            tile_height
        );

        Ok(fb)
    }

    /// Allocate from a [`FramebufferConfig`]
    pub fn from_config(config: &FramebufferConfig) -> Result<Self, Error> {
        Self::new(
            config.width,
            config.height,
            config.tile_width,
            config.tile_height,
        )
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn tile_width(&self) -> u16 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u16 {
        self.tile_height
    }

    /// Tile columns
    pub fn tiles_x(&self) -> u16 {
        self.tiles_x
    }

    /// Tile rows
    pub fn tiles_y(&self) -> u16 {
        self.tiles_y
    }

    /// Whole-buffer window
    pub fn bounds(&self) -> Window {
        Window::full(self.width, self.height)
    }

    /// Raw pixel bytes, `height` rows of `stride` bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// State of tile (`tx`, `ty`), `None` when out of the grid
    pub fn tile_state(&self, tx: u16, ty: u16) -> Option<TileState> {
        self.tile_index(tx, ty).map(|i| self.states[i])
    }

    /// Checksum recorded for tile (`tx`, `ty`) at its last rehash
    pub fn tile_checksum(&self, tx: u16, ty: u16) -> Option<u32> {
        self.tile_index(tx, ty).map(|i| self.checksums[i])
    }

    /// Check if tile (`tx`, `ty`) is waiting to be presented
    pub fn is_tile_dirty(&self, tx: u16, ty: u16) -> bool {
        self.tile_state(tx, ty).is_some_and(TileState::is_dirty)
    }

    /// Number of tiles waiting to be presented
    pub fn dirty_tile_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_dirty()).count()
    }

    /// Pixel-space footprint of tile (`tx`, `ty`), clamped to the buffer
    pub fn tile_window(&self, tx: u16, ty: u16) -> Option<Window> {
        self.tile_index(tx, ty)?;
        Some(self.run_window(ty, tx, tx + 1))
    }

    fn tile_index(&self, tx: u16, ty: u16) -> Option<usize> {
        (tx < self.tiles_x && ty < self.tiles_y)
            .then(|| usize::from(ty) * usize::from(self.tiles_x) + usize::from(tx))
    }

    /// Pixel rectangle covered by tile columns `start..end` of tile row `ty`
    pub(crate) fn run_window(&self, ty: u16, start: u16, end: u16) -> Window {
        let x = u32::from(start) * u32::from(self.tile_width);
        let y = u32::from(ty) * u32::from(self.tile_height);
        let w = (u32::from(end - start) * u32::from(self.tile_width))
            .min(u32::from(self.width) - x);
        let h = u32::from(self.tile_height).min(u32::from(self.height) - y);
        // Tiles lie inside the buffer, so all four fit in u16
        Window::new(x as u16, y as u16, w as u16, h as u16)
    }

    /// Native bytes of `w` pixels starting at (`x`, `y`)
    pub(crate) fn span(&self, x: u16, y: u16, w: u16) -> &[u8] {
        let start = usize::from(y) * self.stride + usize::from(x) * F::BYTES_PER_PIXEL;
        &self.pixels[start..start + usize::from(w) * F::BYTES_PER_PIXEL]
    }

    pub(crate) fn span_mut(&mut self, x: u16, y: u16, w: u16) -> &mut [u8] {
        let start = usize::from(y) * self.stride + usize::from(x) * F::BYTES_PER_PIXEL;
        &mut self.pixels[start..start + usize::from(w) * F::BYTES_PER_PIXEL]
    }
}

impl<F: NativeFormat> core::fmt::Debug for PixelBuffer<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tile_width", &self.tile_width)
            .field("tile_height", &self.tile_height)
            .field("dirty_tiles", &self.dirty_tile_count())
            .finish()
    }
}
