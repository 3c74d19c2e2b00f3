//! Panel control lines
//!
//! Panels are driven by a handful of sideband pins next to the data bus.
//! Drivers address them by role rather than by GPIO number so that the same
//! driver works on any board wiring.

/// Role of a panel control line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlPin {
    /// Data/command select (SPI panels)
    DataCommand,
    /// Backlight enable
    Backlight,
    /// Active-low hardware reset
    Reset,
    /// Chip select
    ChipSelect,
}

/// Logic level of a control line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if this is logic 1
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert!(bool::from(Level::High));
        assert!(!Level::Low.is_high());
    }
}
