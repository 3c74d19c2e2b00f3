//! Configuration type definitions
//!
//! These types describe one display: its framebuffer geometry, the
//! presenter's scratch line and the bus wiring. They can be built in code or
//! deserialized with the `serde` feature.

use heapless::String;
use mosaic_hal::{I2cConfig, I2cPins, SpiConfig, SpiPins};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::Rotation;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Default tile edge in pixels
pub const DEFAULT_TILE_SIZE: u16 = 16;

#[cfg(feature = "serde")]
fn default_tile_size() -> u16 {
    DEFAULT_TILE_SIZE
}

/// Framebuffer geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FramebufferConfig {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Tile width in pixels
    #[cfg_attr(feature = "serde", serde(default = "default_tile_size"))]
    pub tile_width: u16,
    /// Tile height in pixels
    #[cfg_attr(feature = "serde", serde(default = "default_tile_size"))]
    pub tile_height: u16,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
        }
    }
}

/// Presenter scratch sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresenterConfig {
    /// Pixels converted per `write_pixels` call
    ///
    /// Also sizes the scratch line of a [`Device`](crate::device::Device)
    /// built with `Device::open`, so the same bound applies to direct fills
    /// and blits. Each pixel costs two bytes of heap in both.
    pub max_line_pixels: usize,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            max_line_pixels: 240,
        }
    }
}

/// Bus wiring of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BusConfig {
    /// 4-wire SPI (ST77xx TFTs)
    Spi {
        pins: SpiPins,
        #[cfg_attr(feature = "serde", serde(default))]
        spi: SpiConfig,
    },
    /// I2C with control-byte framing (SSD1306 OLEDs)
    I2c {
        pins: I2cPins,
        #[cfg_attr(feature = "serde", serde(default))]
        i2c: I2cConfig,
    },
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::Spi {
            pins: SpiPins::default(),
            spi: SpiConfig::default(),
        }
    }
}

/// Complete description of one display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Display label for logs
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String<MAX_LABEL_LEN>,
    /// Framebuffer geometry (logical, after rotation)
    pub framebuffer: FramebufferConfig,
    /// Presenter and device scratch sizing
    #[cfg_attr(feature = "serde", serde(default))]
    pub presenter: PresenterConfig,
    /// Rotation applied when the device is opened
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: Rotation,
    /// Invert panel colors when the device is opened
    #[cfg_attr(feature = "serde", serde(default))]
    pub invert: bool,
    /// Bus wiring
    pub bus: BusConfig,
}
