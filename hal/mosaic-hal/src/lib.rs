//! Mosaic Hardware Abstraction Layer
//!
//! This crate defines the byte-oriented bus contract that panel drivers are
//! written against, plus the configuration types for the transports that
//! implement it. Chip- or framework-specific crates provide the actual
//! implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Panel driver (ST7789, SSD1306, ...)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  mosaic-hal (this crate - PanelBus)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  mosaic-hal-embedded (SPI / I2C over    │
//! │  embedded-hal 1.0)                      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Contents
//!
//! - [`bus::PanelBus`] - command/data/pixel stream contract
//! - [`gpio::ControlPin`], [`gpio::Level`] - panel control lines
//! - [`spi::SpiConfig`], [`spi::SpiPins`] - SPI transport settings
//! - [`i2c::I2cConfig`], [`i2c::I2cPins`] - I2C transport settings

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod gpio;
pub mod i2c;
pub mod spi;

// Re-export key types at crate root for convenience
pub use bus::{PanelBus, WireFormat};
pub use gpio::{ControlPin, Level};
pub use i2c::{I2cConfig, I2cPins};
pub use spi::{SpiConfig, SpiPins};
