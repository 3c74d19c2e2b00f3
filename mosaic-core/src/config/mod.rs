//! Configuration types
//!
//! Board-agnostic display configuration, optionally loaded from TOML text.

pub mod types;

pub use types::*;

use crate::error::Error;

/// Configuration rejected by [`DisplayConfig::validate`] or the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Zero framebuffer or tile dimension
    InvalidDimensions,
    /// Presenter line of zero pixels
    InvalidLineCapacity,
    /// I2C address does not fit in 7 bits
    InvalidAddress,
    /// Text is not valid TOML or does not match the schema
    Parse,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions => f.write_str("framebuffer and tile sizes must be non-zero"),
            Self::InvalidLineCapacity => f.write_str("presenter line capacity must be non-zero"),
            Self::InvalidAddress => f.write_str("I2C address must be 7-bit"),
            Self::Parse => f.write_str("malformed display configuration"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(_: ConfigError) -> Self {
        Error::InvalidArgument
    }
}

impl FramebufferConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.tile_width == 0 || self.tile_height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

impl DisplayConfig {
    /// Check every constraint the constructors would enforce
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.framebuffer.validate()?;
        if self.presenter.max_line_pixels == 0 {
            return Err(ConfigError::InvalidLineCapacity);
        }
        if let BusConfig::I2c { pins, .. } = &self.bus {
            if !pins.has_valid_address() {
                return Err(ConfigError::InvalidAddress);
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML description
    #[cfg(feature = "toml")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("display config rejected by parser");
            ConfigError::Parse
        })?;
        config.validate()?;
        Ok(config)
    }
}
