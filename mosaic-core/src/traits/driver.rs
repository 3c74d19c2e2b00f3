//! Panel driver contract
//!
//! A driver owns a [`PanelBus`](mosaic_hal::PanelBus) and knows one
//! controller's command set (ST77xx, SSD1306, ...). The core only ever talks
//! to it through this trait, so any number of independent panels can be
//! driven at once.

use mosaic_hal::WireFormat;

use crate::color::Rgba8;
use crate::device::Rotation;
use crate::error::Error;
use crate::geometry::Window;

/// Optional features a driver provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// `set_window` + `write_pixels` address arbitrary rectangles
    pub windowed: bool,
    /// `fill_rect` is implemented in hardware or driver firmware
    pub hw_fill: bool,
    /// Partial refresh without a full-frame flush
    pub partial: bool,
    /// Pixel data can be read back
    pub readback: bool,
    /// Display inversion supported
    pub invert: bool,
    /// Electrophoretic panel; `present` triggers a slow refresh
    pub epd: bool,
}

impl Capabilities {
    /// Plain windowed RGB panel (ST77xx family)
    pub const WINDOWED: Self = Self {
        windowed: true,
        hw_fill: false,
        partial: true,
        readback: false,
        invert: true,
        epd: false,
    };
}

/// Operations a panel driver provides to the graphics core
///
/// Required methods return the driver's own error. Optional methods return
/// [`Error::Unsupported`] unless the driver overrides them.
pub trait PanelDriver {
    /// Transport or controller error
    type Error;

    /// Features this driver implements
    fn capabilities(&self) -> Capabilities;

    /// Panel size in pixels at rotation 0
    fn size(&self) -> (u16, u16);

    /// Reset and configure the controller
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Change the memory scan direction
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error>;

    /// Set the address window for the next pixel stream
    fn set_window(&mut self, window: Window) -> Result<(), Self::Error>;

    /// Stream `count` pixels into the current window
    ///
    /// The panel's write cursor advances row-major through the window, so a
    /// window can be filled with any number of calls.
    fn write_pixels(
        &mut self,
        data: &[u8],
        count: usize,
        format: WireFormat,
    ) -> Result<(), Self::Error>;

    /// Fill a rectangle without streaming pixel data
    fn fill_rect(&mut self, window: Window, color: Rgba8) -> Result<(), Error<Self::Error>> {
        let _ = (window, color);
        Err(Error::Unsupported)
    }

    /// Flush a driver-side shadow buffer to the panel
    ///
    /// Page-addressed panels (SSD1306) collect pixels in RAM and push them
    /// here. Directly addressed panels have nothing to do.
    fn present(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Turn the panel output on or off
    fn power(&mut self, on: bool) -> Result<(), Error<Self::Error>> {
        let _ = on;
        Err(Error::Unsupported)
    }

    fn invert(&mut self, on: bool) -> Result<(), Error<Self::Error>> {
        let _ = on;
        Err(Error::Unsupported)
    }

    /// Set backlight or contrast, 0-100 %
    fn brightness(&mut self, percent: u8) -> Result<(), Error<Self::Error>> {
        let _ = percent;
        Err(Error::Unsupported)
    }
}
