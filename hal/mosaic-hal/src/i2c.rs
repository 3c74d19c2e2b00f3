//! I2C transport settings
//!
//! I2C panels (SSD1306 and friends) multiplex commands and data over the
//! same address by prefixing every transfer with a control byte.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Control byte announcing a command stream
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte announcing a data (GDDRAM) stream
pub const CONTROL_DATA: u8 = 0x40;

/// Default 7-bit address of SSD1306-class panels
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// I2C clock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::FAST
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
    };
}

/// GPIO assignment and address of an I2C panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I2cPins {
    /// Serial data
    pub sda: u8,
    /// Serial clock
    pub scl: u8,
    /// Hardware reset
    #[cfg_attr(feature = "serde", serde(default))]
    pub rst: Option<u8>,
    /// Backlight enable
    #[cfg_attr(feature = "serde", serde(default))]
    pub bl: Option<u8>,
    /// 7-bit device address
    #[cfg_attr(feature = "serde", serde(default = "default_address"))]
    pub address: u8,
}

#[cfg(feature = "serde")]
fn default_address() -> u8 {
    DEFAULT_ADDRESS
}

impl I2cPins {
    /// Check that the address fits in 7 bits
    pub const fn has_valid_address(&self) -> bool {
        self.address <= 0x7F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fast_mode() {
        assert_eq!(I2cConfig::default(), I2cConfig::FAST);
    }

    #[test]
    fn test_address_validation() {
        let mut pins = I2cPins {
            sda: 21,
            scl: 22,
            rst: None,
            bl: None,
            address: DEFAULT_ADDRESS,
        };
        assert!(pins.has_valid_address());
        pins.address = 0x80;
        assert!(!pins.has_valid_address());
    }
}
