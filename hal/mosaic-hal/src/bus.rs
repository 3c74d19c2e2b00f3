//! Panel bus contract
//!
//! Every panel controller in the supported family speaks the same shape of
//! protocol: a command byte, optional parameter bytes, then a stream of pixel
//! data. [`PanelBus`] captures that shape so a panel driver can be written
//! once and run over SPI, I2C or anything else that moves bytes.

use crate::gpio::{ControlPin, Level};

/// Format of a pixel stream handed to the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WireFormat {
    /// 16-bit RGB565, two bytes per pixel, most significant byte first
    Rgb565,
    /// 1 bit per pixel, packed MSB-first
    Mono1,
}

impl WireFormat {
    /// Number of bytes needed to carry `count` pixels in this format
    pub const fn byte_len(self, count: usize) -> usize {
        match self {
            Self::Rgb565 => count * 2,
            Self::Mono1 => count.div_ceil(8),
        }
    }
}

/// Byte-oriented transport between a panel driver and the panel
///
/// `write_cmd`, `write_data`, `write_pixels`, `delay_ms` and `gpio_set` are
/// required.
/// The remaining operations have defaults expressed in terms of those, which
/// transports may override with something faster (DMA, burst writes).
pub trait PanelBus {
    /// Error type for bus operations
    type Error;

    /// Claim the bus (assert chip-select, take a mutex, ...)
    fn begin(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Release the bus
    fn end(&mut self) {}

    /// Send a single command byte
    fn write_cmd(&mut self, cmd: u8) -> Result<(), Self::Error>;

    /// Send data bytes following a command
    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Send the same `unit` of bytes `count` times
    ///
    /// Used for solid fills where materialising the whole run would need an
    /// arbitrarily large buffer.
    fn write_repeat(&mut self, unit: &[u8], count: usize) -> Result<(), Self::Error> {
        for _ in 0..count {
            self.write_data(unit)?;
        }
        Ok(())
    }

    /// Send `count` pixels encoded as `format`
    ///
    /// `data` must hold at least `format.byte_len(count)` bytes; anything past
    /// that is ignored. A shorter buffer is an error and nothing is sent, since
    /// a partial stream would leave the panel's write cursor out of step with
    /// its window.
    fn write_pixels(
        &mut self,
        data: &[u8],
        count: usize,
        format: WireFormat,
    ) -> Result<(), Self::Error>;

    /// Read bytes back from the panel
    ///
    /// Returns the number of bytes read. Transports without a read path
    /// return `Ok(0)`.
    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let _ = buf;
        Ok(0)
    }

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Drive a panel control line
    ///
    /// Lines the transport does not have wired are ignored.
    fn gpio_set(&mut self, pin: ControlPin, level: Level) -> Result<(), Self::Error>;

    /// Send a command followed by its parameter bytes
    fn command(&mut self, cmd: u8, params: &[u8]) -> Result<(), Self::Error> {
        self.write_cmd(cmd)?;
        if !params.is_empty() {
            self.write_data(params)?;
        }
        Ok(())
    }

    /// Pulse the reset line: high, low, high, with the given settle times
    fn hard_reset(&mut self, pulse_ms: u32, settle_ms: u32) -> Result<(), Self::Error> {
        self.gpio_set(ControlPin::Reset, Level::High)?;
        self.delay_ms(pulse_ms);
        self.gpio_set(ControlPin::Reset, Level::Low)?;
        self.delay_ms(pulse_ms);
        self.gpio_set(ControlPin::Reset, Level::High)?;
        self.delay_ms(settle_ms);
        Ok(())
    }
}
