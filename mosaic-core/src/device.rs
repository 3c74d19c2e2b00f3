//! Device handle: a panel driver plus clip, rotation and a scratch line
//!
//! The device draws straight to the panel, without a framebuffer. Fills use
//! the driver's hardware path when it has one and otherwise stream a solid
//! RGB565 run through the scratch line. For flicker-free partial updates
//! draw into a [`PixelBuffer`] and call [`Device::present_frame`].

use alloc::vec::Vec;

use mosaic_hal::WireFormat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Rgba8;
use crate::config::DisplayConfig;
use crate::error::Error;
use crate::format::NativeFormat;
use crate::framebuffer::{try_alloc, PixelBuffer};
use crate::geometry::{Rect, Window};
use crate::present::Presenter;
use crate::traits::PanelDriver;

/// Panel orientation, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation from a quarter-turn count; only the low two bits are used
    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Quarter-turn count, 0..=3
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Check if width and height trade places
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// A panel and the drawing state that goes with it
pub struct Device<D: PanelDriver> {
    driver: D,
    width: u16,
    height: u16,
    rotation: Rotation,
    /// `None` when the clip rectangle lies entirely off-panel
    clip: Option<Window>,
    /// Big-endian RGB565 pixels for streamed fills
    scratch: Vec<u8>,
}

impl<D: PanelDriver> Device<D> {
    /// Wrap `driver` with a scratch line of `scratch_pixels` pixels
    ///
    /// The driver is not initialised; call [`init`](Self::init) or use
    /// [`open`](Self::open). A zero-sized scratch is allowed but then
    /// streamed fills fail with [`Error::OutOfMemory`].
    pub fn new(driver: D, scratch_pixels: usize) -> Result<Self, Error> {
        let bytes = scratch_pixels
            .checked_mul(WireFormat::Rgb565.byte_len(1))
            .ok_or(Error::OutOfMemory)?;
        let scratch = try_alloc(bytes, 0u8)?;
        let (width, height) = driver.size();
        Ok(Self {
            driver,
            width,
            height,
            rotation: Rotation::Deg0,
            clip: Some(Window::full(width, height)),
            scratch,
        })
    }

    /// Build, initialise and orient a device from its configuration
    ///
    /// The scratch line holds `config.presenter.max_line_pixels` pixels.
    pub fn open(driver: D, config: &DisplayConfig) -> Result<Self, Error<D::Error>> {
        config.validate().map_err(|_| Error::InvalidArgument)?;
        let mut device =
            Self::new(driver, config.presenter.max_line_pixels).map_err(Error::widen)?;
        device.init()?;
        device.set_rotation(config.rotation)?;
        if config.invert {
            match device.driver.invert(true) {
                Err(Error::Unsupported) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("{}: inversion not supported", config.label.as_str());
                }
                other => other?,
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{}: opened {}x{}",
            config.label.as_str(),
            device.width,
            device.height
        );

        Ok(device)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Give the driver back
    pub fn release(self) -> D {
        self.driver
    }

    /// Logical width in the current rotation
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height in the current rotation
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn clip(&self) -> Option<Window> {
        self.clip
    }

    pub fn init(&mut self) -> Result<(), Error<D::Error>> {
        self.driver.init().map_err(Error::Transport)
    }

    /// Rotate the panel; resets the clip to the new full area
    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Error<D::Error>> {
        self.driver
            .set_rotation(rotation)
            .map_err(Error::Transport)?;
        let (w, h) = self.driver.size();
        (self.width, self.height) = if rotation.swaps_axes() { (h, w) } else { (w, h) };
        self.rotation = rotation;
        self.reset_clip();
        Ok(())
    }

    /// Restrict drawing to `rect`, intersected with the panel
    pub fn set_clip(&mut self, rect: Rect) {
        self.clip = rect.clip_to(self.full());
    }

    pub fn reset_clip(&mut self) {
        self.clip = Some(self.full());
    }

    /// Fill the whole panel, ignoring the clip
    pub fn clear(&mut self, color: Rgba8) -> Result<(), Error<D::Error>> {
        self.fill_window(self.full(), color)
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Rgba8) -> Result<(), Error<D::Error>> {
        self.fill_rect(x, y, 1, 1, color)
    }

    /// Fill a rectangle, clipped
    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgba8,
    ) -> Result<(), Error<D::Error>> {
        match self.clipped(Rect::new(x, y, w, h)) {
            Some(win) => self.fill_window(win, color),
            None => Ok(()),
        }
    }

    pub fn hline(&mut self, x: i32, y: i32, w: i32, color: Rgba8) -> Result<(), Error<D::Error>> {
        self.fill_rect(x, y, w, 1, color)
    }

    pub fn vline(&mut self, x: i32, y: i32, h: i32, color: Rgba8) -> Result<(), Error<D::Error>> {
        self.fill_rect(x, y, 1, h, color)
    }

    /// One-pixel outline
    pub fn rect_outline(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgba8,
    ) -> Result<(), Error<D::Error>> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        self.hline(x, y, w, color)?;
        self.hline(x, y.saturating_add(h - 1), w, color)?;
        self.vline(x, y.saturating_add(1), h - 2, color)?;
        self.vline(x.saturating_add(w - 1), y.saturating_add(1), h - 2, color)
    }

    /// Copy a `w` x `h` image to the panel at (`x`, `y`), clipped
    ///
    /// `pixels` holds rows `pitch` bytes apart in `format`: big-endian RGB565,
    /// or MSB-first MONO1. Rows are forwarded to the driver as-is when
    /// possible; MONO1 rows clipped on the left are realigned through the
    /// scratch line.
    #[allow(clippy::too_many_arguments)]
    pub fn blit(
        &mut self,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        format: WireFormat,
        pixels: &[u8],
        pitch: usize,
    ) -> Result<(), Error<D::Error>> {
        if !self.driver.capabilities().windowed {
            return Err(Error::Unsupported);
        }
        let row_bytes = format.byte_len(usize::from(w));
        if pitch < row_bytes {
            return Err(Error::InvalidArgument);
        }
        if h > 0 {
            let needed = pitch
                .checked_mul(usize::from(h) - 1)
                .and_then(|n| n.checked_add(row_bytes))
                .ok_or(Error::InvalidArgument)?;
            if pixels.len() < needed {
                return Err(Error::InvalidArgument);
            }
        }
        let Some(win) = self.clipped(Rect::new(x, y, i32::from(w), i32::from(h))) else {
            return Ok(());
        };
        let ox = (i64::from(win.x) - i64::from(x)) as usize;
        let oy = (i64::from(win.y) - i64::from(y)) as usize;
        let count = usize::from(win.w);

        self.driver.set_window(win).map_err(Error::Transport)?;
        for j in 0..usize::from(win.h) {
            let row = &pixels[(oy + j) * pitch..];
            match format {
                WireFormat::Rgb565 => {
                    let start = ox * 2;
                    self.driver
                        .write_pixels(&row[start..start + count * 2], count, format)
                        .map_err(Error::Transport)?;
                }
                WireFormat::Mono1 if ox % 8 == 0 => {
                    let start = ox / 8;
                    self.driver
                        .write_pixels(&row[start..start + format.byte_len(count)], count, format)
                        .map_err(Error::Transport)?;
                }
                WireFormat::Mono1 => self.write_mono_shifted(row, ox, count)?,
            }
        }
        Ok(())
    }

    /// Flush the driver's shadow buffer, if it keeps one
    pub fn present(&mut self) -> Result<(), Error<D::Error>> {
        self.driver.present().map_err(Error::Transport)
    }

    /// Send the dirty tiles of `fb` to this panel
    pub fn present_frame<F: NativeFormat>(
        &mut self,
        presenter: &mut Presenter,
        fb: &mut PixelBuffer<F>,
    ) -> Result<(), Error<D::Error>> {
        presenter.present_frame(&mut self.driver, fb)
    }

    fn full(&self) -> Window {
        Window::full(self.width, self.height)
    }

    fn clipped(&self, rect: Rect) -> Option<Window> {
        rect.clip_to(self.clip?)
    }

    fn fill_window(&mut self, win: Window, color: Rgba8) -> Result<(), Error<D::Error>> {
        let caps = self.driver.capabilities();
        if caps.hw_fill {
            return self.driver.fill_rect(win, color);
        }
        if !caps.windowed {
            return Err(Error::Unsupported);
        }
        let capacity = self.scratch.len() / 2;
        if capacity == 0 {
            return Err(Error::OutOfMemory);
        }

        self.driver.set_window(win).map_err(Error::Transport)?;
        let mut remaining = win.area() as usize;
        let n = remaining.min(capacity);
        let wire = color.to_rgb565().to_be_bytes();
        for px in self.scratch[..n * 2].chunks_exact_mut(2) {
            px.copy_from_slice(&wire);
        }
        while remaining > 0 {
            let n = remaining.min(capacity);
            self.driver
                .write_pixels(&self.scratch[..n * 2], n, WireFormat::Rgb565)
                .map_err(Error::Transport)?;
            remaining -= n;
        }
        Ok(())
    }

    /// Send `count` MONO1 pixels of `row` starting at bit `offset`
    fn write_mono_shifted(
        &mut self,
        row: &[u8],
        offset: usize,
        count: usize,
    ) -> Result<(), Error<D::Error>> {
        let chunk_px = self.scratch.len() * 8;
        if chunk_px == 0 {
            return Err(Error::OutOfMemory);
        }
        let mut done = 0;
        while done < count {
            let n = (count - done).min(chunk_px);
            let out = &mut self.scratch[..n.div_ceil(8)];
            out.fill(0);
            for i in 0..n {
                let bit = offset + done + i;
                if row[bit / 8] & (0x80 >> (bit % 8)) != 0 {
                    out[i / 8] |= 0x80 >> (i % 8);
                }
            }
            self.driver
                .write_pixels(out, n, WireFormat::Mono1)
                .map_err(Error::Transport)?;
            done += n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DriverCall, RecordingDriver};
    use crate::traits::Capabilities;

    fn device() -> Device<RecordingDriver> {
        Device::new(RecordingDriver::new(32, 24), 16).unwrap()
    }

    #[test]
    fn test_rotation_index_is_masked() {
        assert_eq!(Rotation::from_index(1), Rotation::Deg90);
        assert_eq!(Rotation::from_index(6), Rotation::Deg180);
        assert_eq!(Rotation::from_index(255), Rotation::Deg270);
        assert_eq!(Rotation::Deg270.index(), 3);
    }

    #[test]
    fn test_set_rotation_swaps_dimensions() {
        let mut dev = device();
        dev.set_clip(Rect::new(0, 0, 4, 4));
        dev.set_rotation(Rotation::Deg90).unwrap();

        assert_eq!((dev.width(), dev.height()), (24, 32));
        assert_eq!(dev.clip(), Some(Window::full(24, 32)));
        assert_eq!(
            dev.driver().calls(),
            [DriverCall::SetRotation(Rotation::Deg90)]
        );

        dev.set_rotation(Rotation::Deg180).unwrap();
        assert_eq!((dev.width(), dev.height()), (32, 24));
    }

    #[test]
    fn test_streamed_fill_is_chunked() {
        let mut dev = device();
        dev.fill_rect(2, 2, 10, 4, Rgba8::RED).unwrap();

        let calls = dev.driver().calls();
        assert_eq!(calls[0], DriverCall::SetWindow(Window::new(2, 2, 10, 4)));
        assert_eq!(dev.driver().pixels_written(), 40);
        assert_eq!(calls.len(), 1 + 3);
        assert_eq!(dev.driver().panel_pixel(11, 5), Some(0xF800));
        assert_eq!(dev.driver().panel_pixel(12, 5), Some(0));
    }

    #[test]
    fn test_fill_respects_clip() {
        let mut dev = device();
        dev.set_clip(Rect::new(4, 4, 4, 4));
        dev.fill_rect(0, 0, 32, 24, Rgba8::WHITE).unwrap();

        assert_eq!(dev.driver().windows(), [Window::new(4, 4, 4, 4)]);

        dev.set_clip(Rect::new(40, 0, 4, 4));
        assert_eq!(dev.clip(), None);
        dev.draw_pixel(0, 0, Rgba8::WHITE).unwrap();
        assert_eq!(dev.driver().windows().len(), 1);
    }

    #[test]
    fn test_clear_ignores_clip() {
        let mut dev = device();
        dev.set_clip(Rect::new(4, 4, 4, 4));
        dev.clear(Rgba8::BLUE).unwrap();
        assert_eq!(dev.driver().windows(), [Window::full(32, 24)]);
    }

    #[test]
    fn test_hw_fill_path() {
        let caps = Capabilities {
            hw_fill: true,
            ..Capabilities::WINDOWED
        };
        let mut dev = Device::new(RecordingDriver::new(32, 24).with_capabilities(caps), 0).unwrap();
        dev.fill_rect(-2, -2, 4, 4, Rgba8::GREEN).unwrap();

        assert_eq!(
            dev.driver().calls(),
            [DriverCall::FillRect(Window::new(0, 0, 2, 2), Rgba8::GREEN)]
        );
        assert_eq!(dev.driver().panel_pixel(1, 1), Some(0x07E0));
    }

    #[test]
    fn test_empty_scratch_is_out_of_memory() {
        let mut dev = Device::new(RecordingDriver::new(32, 24), 0).unwrap();
        assert_eq!(
            dev.fill_rect(0, 0, 2, 2, Rgba8::WHITE),
            Err(Error::OutOfMemory)
        );
        assert!(dev.driver().calls().is_empty());
    }

    #[test]
    fn test_windowless_fill_unsupported() {
        let drv = RecordingDriver::new(32, 24).with_capabilities(Capabilities::default());
        let mut dev = Device::new(drv, 16).unwrap();
        assert_eq!(
            dev.fill_rect(0, 0, 2, 2, Rgba8::WHITE),
            Err(Error::Unsupported)
        );
    }

    #[test]
    fn test_outline_draws_four_edges() {
        let mut dev = device();
        dev.rect_outline(0, 0, 4, 3, Rgba8::WHITE).unwrap();
        assert_eq!(
            dev.driver().windows(),
            [
                Window::new(0, 0, 4, 1),
                Window::new(0, 2, 4, 1),
                Window::new(0, 1, 1, 1),
                Window::new(3, 1, 1, 1),
            ]
        );
    }

    #[test]
    fn test_blit_rgb565_clipped() {
        let mut dev = device();
        // 3x2 image, pitch 8 bytes (one pad pixel per row)
        let img = [
            0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0xEE, 0xEE, //
            0x00, 0x04, 0x00, 0x05, 0x00, 0x06, 0xEE, 0xEE,
        ];
        dev.blit(-1, 0, 3, 2, WireFormat::Rgb565, &img, 8).unwrap();

        assert_eq!(dev.driver().windows(), [Window::new(0, 0, 2, 2)]);
        assert_eq!(dev.driver().panel_pixel(0, 0), Some(2));
        assert_eq!(dev.driver().panel_pixel(1, 0), Some(3));
        assert_eq!(dev.driver().panel_pixel(0, 1), Some(5));
        assert_eq!(dev.driver().panel_pixel(1, 1), Some(6));
    }

    #[test]
    fn test_blit_mono_realigned() {
        let mut dev = device();
        let img = [0b0101_0000u8, 0b1100_0000];
        dev.blit(-1, 0, 10, 1, WireFormat::Mono1, &img, 2).unwrap();

        // Source pixels 1..10: 1,0,1,0,0,0,0,1,1
        let expected = [true, false, true, false, false, false, false, true, true];
        for (x, on) in expected.iter().enumerate() {
            let want = if *on { 0xFFFF } else { 0 };
            assert_eq!(dev.driver().panel_pixel(x as u16, 0), Some(want), "x = {x}");
        }
        assert_eq!(dev.driver().last_bytes(), [0b1010_0001, 0b1000_0000]);
    }

    #[test]
    fn test_blit_rejects_short_buffer() {
        let mut dev = device();
        assert_eq!(
            dev.blit(0, 0, 4, 2, WireFormat::Rgb565, &[0; 12], 8),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            dev.blit(0, 0, 4, 2, WireFormat::Rgb565, &[0; 16], 6),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn test_open_applies_config() {
        let config = DisplayConfig {
            rotation: Rotation::Deg270,
            invert: true,
            ..Default::default()
        };
        let dev = Device::open(RecordingDriver::new(32, 24), &config).unwrap();

        assert_eq!(
            dev.driver().calls(),
            [
                DriverCall::Init,
                DriverCall::SetRotation(Rotation::Deg270),
                DriverCall::Invert(true),
            ]
        );
        assert_eq!((dev.width(), dev.height()), (24, 32));
    }

    #[test]
    fn test_open_sizes_scratch_from_line_capacity() {
        let mut config = DisplayConfig::default();
        config.presenter.max_line_pixels = 8;
        let mut dev = Device::open(RecordingDriver::new(32, 24), &config).unwrap();
        dev.driver_mut().clear_calls();

        dev.fill_rect(0, 0, 10, 2, Rgba8::WHITE).unwrap();

        let counts: Vec<usize> = dev
            .driver()
            .calls()
            .iter()
            .filter_map(|c| match c {
                DriverCall::WritePixels { count, .. } => Some(*count),
                _ => None,
            })
            .collect();
        assert_eq!(counts, [8, 8, 4]);
    }

    #[test]
    fn test_open_tolerates_missing_inversion() {
        let config = DisplayConfig {
            invert: true,
            ..Default::default()
        };
        let drv = RecordingDriver::new(32, 24).with_capabilities(Capabilities {
            invert: false,
            ..Capabilities::WINDOWED
        });
        assert!(Device::open(drv, &config).is_ok());
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let mut config = DisplayConfig::default();
        config.presenter.max_line_pixels = 0;
        assert_eq!(
            Device::open(RecordingDriver::new(32, 24), &config).err(),
            Some(Error::InvalidArgument)
        );
    }

    #[test]
    fn test_present_frame_through_device() {
        let mut dev = device();
        let mut fb = PixelBuffer::<crate::format::Rgb565>::new(32, 24, 16, 16).unwrap();
        let mut presenter = Presenter::new(32).unwrap();

        fb.put_pixel(20, 20, Rgba8::WHITE);
        dev.present_frame(&mut presenter, &mut fb).unwrap();
        dev.present().unwrap();

        assert_eq!(
            dev.driver().windows(),
            [Window::new(16, 16, 16, 8)]
        );
        assert_eq!(dev.driver().calls().last(), Some(&DriverCall::Present));
        assert_eq!(dev.driver().panel_pixel(20, 20), Some(0xFFFF));
    }
}
