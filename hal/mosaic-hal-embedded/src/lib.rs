//! embedded-hal 1.0 transports for Mosaic panels
//!
//! This crate implements the [`mosaic_hal::PanelBus`] contract on top of the
//! `embedded-hal` 1.0 blocking traits, so any chip HAL that provides an
//! `SpiDevice` or `I2c` implementation can drive a panel:
//!
//! - [`SpiPanelBus`] - 4-wire SPI with a D/C line (ST7735, ST7789, ST7796, ...)
//! - [`I2cPanelBus`] - control-byte framed I2C (SSD1306, SH1106, ...)
//!
//! Chip select is owned by the `SpiDevice`; the bus only drives D/C, reset and
//! backlight.

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod spi;

pub use i2c::{I2cBusError, I2cPanelBus};
pub use spi::{SpiBusError, SpiPanelBus};
