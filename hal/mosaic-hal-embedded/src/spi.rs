//! 4-wire SPI panel bus
//!
//! Commands are sent with D/C low, parameters and pixel data with D/C high.
//! The `SpiDevice` asserts chip select around every transfer.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use mosaic_hal::{ControlPin, Level, PanelBus, WireFormat};

/// Size of the stack buffer used to expand `write_repeat` runs
const REPEAT_CHUNK: usize = 64;

/// Error from SPI bus operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiBusError<S, P> {
    /// SPI transfer failed
    Spi(S),
    /// Control line could not be driven
    Pin(P),
    /// Pixel buffer shorter than the pixel count requires
    Length,
}

impl<S: core::fmt::Debug, P: core::fmt::Debug> core::fmt::Display for SpiBusError<S, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI transfer failed: {e:?}"),
            Self::Pin(e) => write!(f, "control pin error: {e:?}"),
            Self::Length => f.write_str("pixel buffer too short"),
        }
    }
}

/// Panel bus over an `embedded-hal` SPI device
///
/// All control lines share one pin type `P`, which is what chip HALs hand out
/// for type-erased outputs.
pub struct SpiPanelBus<SPI, P, D> {
    spi: SPI,
    dc: P,
    rst: Option<P>,
    bl: Option<P>,
    delay: D,
    /// Last level written to D/C, to skip redundant pin writes
    dc_level: Option<Level>,
}

impl<SPI, P, D> SpiPanelBus<SPI, P, D>
where
    SPI: SpiDevice,
    P: OutputPin,
    D: DelayNs,
{
    /// Create a bus with only the mandatory D/C line
    pub fn new(spi: SPI, dc: P, delay: D) -> Self {
        Self {
            spi,
            dc,
            rst: None,
            bl: None,
            delay,
            dc_level: None,
        }
    }

    /// Attach a hardware reset line
    pub fn with_reset(mut self, rst: P) -> Self {
        self.rst = Some(rst);
        self
    }

    /// Attach a backlight enable line
    pub fn with_backlight(mut self, bl: P) -> Self {
        self.bl = Some(bl);
        self
    }

    /// Tear the bus down and hand back the SPI device, D/C, reset and
    /// backlight pins and the delay
    pub fn release(self) -> (SPI, P, Option<P>, Option<P>, D) {
        (self.spi, self.dc, self.rst, self.bl, self.delay)
    }

    fn set_dc(&mut self, level: Level) -> Result<(), SpiBusError<SPI::Error, P::Error>> {
        if self.dc_level == Some(level) {
            return Ok(());
        }
        drive(&mut self.dc, level).map_err(SpiBusError::Pin)?;
        self.dc_level = Some(level);
        Ok(())
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: Level) -> Result<(), P::Error> {
    match level {
        Level::High => pin.set_high(),
        Level::Low => pin.set_low(),
    }
}

impl<SPI, P, D> PanelBus for SpiPanelBus<SPI, P, D>
where
    SPI: SpiDevice,
    P: OutputPin,
    D: DelayNs,
{
    type Error = SpiBusError<SPI::Error, P::Error>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        // Release reset so the controller can accept commands
        if let Some(rst) = self.rst.as_mut() {
            rst.set_high().map_err(SpiBusError::Pin)?;
        }
        Ok(())
    }

    fn write_cmd(&mut self, cmd: u8) -> Result<(), Self::Error> {
        self.set_dc(Level::Low)?;
        self.spi.write(&[cmd]).map_err(SpiBusError::Spi)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }
        self.set_dc(Level::High)?;
        self.spi.write(data).map_err(SpiBusError::Spi)
    }

    fn write_repeat(&mut self, unit: &[u8], count: usize) -> Result<(), Self::Error> {
        if unit.is_empty() || count == 0 {
            return Ok(());
        }
        if unit.len() > REPEAT_CHUNK {
            for _ in 0..count {
                self.write_data(unit)?;
            }
            return Ok(());
        }

        let per_chunk = REPEAT_CHUNK / unit.len();
        let mut chunk = [0u8; REPEAT_CHUNK];
        for slot in chunk.chunks_exact_mut(unit.len()) {
            slot.copy_from_slice(unit);
        }

        self.set_dc(Level::High)?;
        let mut remaining = count;
        while remaining > 0 {
            let units = remaining.min(per_chunk);
            self.spi
                .write(&chunk[..units * unit.len()])
                .map_err(SpiBusError::Spi)?;
            remaining -= units;
        }
        Ok(())
    }

    fn write_pixels(
        &mut self,
        data: &[u8],
        count: usize,
        format: WireFormat,
    ) -> Result<(), Self::Error> {
        let bytes = data
            .get(..format.byte_len(count))
            .ok_or(SpiBusError::Length)?;
        self.write_data(bytes)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn gpio_set(&mut self, pin: ControlPin, level: Level) -> Result<(), Self::Error> {
        match pin {
            ControlPin::DataCommand => self.set_dc(level),
            ControlPin::Reset => match self.rst.as_mut() {
                Some(rst) => drive(rst, level).map_err(SpiBusError::Pin),
                None => Ok(()),
            },
            ControlPin::Backlight => match self.bl.as_mut() {
                Some(bl) => drive(bl, level).map_err(SpiBusError::Pin),
                None => Ok(()),
            },
            // Owned by the SpiDevice
            ControlPin::ChipSelect => Ok(()),
        }
    }
}
