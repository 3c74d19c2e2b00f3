//! SPI transport settings
//!
//! Pin assignments and clock configuration for 4-wire SPI panels
//! (SCK, MOSI, optional MISO, CS, plus D/C and optional RST/BL lines).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SPI mode (combined clock polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// CPOL=0, CPHA=0 (what the ST77xx family expects)
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

/// SPI clock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock mode
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 40_000_000, // 40 MHz, safe for most TFT controllers
            mode: Mode::Mode0,
        }
    }
}

/// GPIO assignment of an SPI panel
///
/// Pin numbers are board GPIO numbers. Optional lines that are not wired
/// are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiPins {
    /// Serial clock
    pub sck: u8,
    /// Controller out, peripheral in
    pub mosi: u8,
    /// Controller in, peripheral out (readback)
    #[cfg_attr(feature = "serde", serde(default))]
    pub miso: Option<u8>,
    /// Chip select
    #[cfg_attr(feature = "serde", serde(default))]
    pub cs: Option<u8>,
    /// Data/command select
    pub dc: u8,
    /// Hardware reset
    #[cfg_attr(feature = "serde", serde(default))]
    pub rst: Option<u8>,
    /// Backlight enable
    #[cfg_attr(feature = "serde", serde(default))]
    pub bl: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpiConfig::default();
        assert_eq!(config.frequency, 40_000_000);
        assert_eq!(config.mode, Mode::Mode0);
    }

    #[test]
    fn test_default_pins_have_no_optional_lines() {
        let pins = SpiPins::default();
        assert!(pins.miso.is_none());
        assert!(pins.rst.is_none());
        assert!(pins.bl.is_none());
    }
}
