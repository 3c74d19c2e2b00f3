//! I2C panel bus
//!
//! Every transfer starts with a control byte: [`CONTROL_COMMAND`] for a
//! command, [`CONTROL_DATA`] for display RAM. Data is split into short
//! transfers so the bus never needs more than a small stack frame.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use mosaic_hal::i2c::{CONTROL_COMMAND, CONTROL_DATA};
use mosaic_hal::{ControlPin, Level, PanelBus, WireFormat};

/// Maximum data bytes per I2C transfer (excluding the control byte)
pub const MAX_CHUNK: usize = 16;

/// Error from I2C bus operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError<I, P> {
    /// I2C transfer failed (NACK, arbitration, ...)
    I2c(I),
    /// Control line could not be driven
    Pin(P),
    /// Operation not available on I2C panels (e.g. RGB565 streaming)
    Unsupported,
    /// Pixel buffer shorter than the pixel count requires
    Length,
}

impl<I: core::fmt::Debug, P: core::fmt::Debug> core::fmt::Display for I2cBusError<I, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C transfer failed: {e:?}"),
            Self::Pin(e) => write!(f, "control pin error: {e:?}"),
            Self::Unsupported => f.write_str("operation not supported on I2C"),
            Self::Length => f.write_str("pixel buffer too short"),
        }
    }
}

/// Panel bus over an `embedded-hal` I2C master
pub struct I2cPanelBus<I2C, P, D> {
    i2c: I2C,
    address: u8,
    rst: Option<P>,
    bl: Option<P>,
    delay: D,
}

impl<I2C, P, D> I2cPanelBus<I2C, P, D>
where
    I2C: I2c,
    P: OutputPin,
    D: DelayNs,
{
    /// Create a bus talking to the panel at the 7-bit `address`
    pub fn new(i2c: I2C, address: u8, delay: D) -> Self {
        Self {
            i2c,
            address,
            rst: None,
            bl: None,
            delay,
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

    /// Device address in use
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Tear the bus down and hand back the I2C master, reset and backlight
    /// pins and the delay
    pub fn release(self) -> (I2C, Option<P>, Option<P>, D) {
        (self.i2c, self.rst, self.bl, self.delay)
    }

    fn send_chunk(&mut self, payload: &[u8]) -> Result<(), I2cBusError<I2C::Error, P::Error>> {
        let mut frame = [0u8; MAX_CHUNK + 1];
        let len = payload.len().min(MAX_CHUNK);
        frame[0] = CONTROL_DATA;
        frame[1..=len].copy_from_slice(&payload[..len]);
        self.i2c
            .write(self.address, &frame[..=len])
            .map_err(I2cBusError::I2c)
    }
}

fn drive<P: OutputPin>(pin: Option<&mut P>, level: Level) -> Result<(), P::Error> {
    match (pin, level) {
        (Some(pin), Level::High) => pin.set_high(),
        (Some(pin), Level::Low) => pin.set_low(),
        (None, _) => Ok(()),
    }
}

impl<I2C, P, D> PanelBus for I2cPanelBus<I2C, P, D>
where
    I2C: I2c,
    P: OutputPin,
    D: DelayNs,
{
    type Error = I2cBusError<I2C::Error, P::Error>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        drive(self.rst.as_mut(), Level::High).map_err(I2cBusError::Pin)?;
        drive(self.bl.as_mut(), Level::High).map_err(I2cBusError::Pin)
    }

    fn write_cmd(&mut self, cmd: u8) -> Result<(), Self::Error> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, cmd])
            .map_err(I2cBusError::I2c)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for chunk in data.chunks(MAX_CHUNK) {
            self.send_chunk(chunk)?;
        }
        Ok(())
    }

    fn write_repeat(&mut self, unit: &[u8], count: usize) -> Result<(), Self::Error> {
        if unit.is_empty() || count == 0 {
            return Ok(());
        }
        if unit.len() > MAX_CHUNK {
            for _ in 0..count {
                self.write_data(unit)?;
            }
            return Ok(());
        }

        let per_chunk = MAX_CHUNK / unit.len();
        let mut chunk = [0u8; MAX_CHUNK];
        for slot in chunk.chunks_exact_mut(unit.len()) {
            slot.copy_from_slice(unit);
        }

        let mut remaining = count;
        while remaining > 0 {
            let units = remaining.min(per_chunk);
            self.send_chunk(&chunk[..units * unit.len()])?;
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
        match format {
            WireFormat::Mono1 => {
                let bytes = data
                    .get(..format.byte_len(count))
                    .ok_or(I2cBusError::Length)?;
                self.write_data(bytes)
            }
            WireFormat::Rgb565 => Err(I2cBusError::Unsupported),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn gpio_set(&mut self, pin: ControlPin, level: Level) -> Result<(), Self::Error> {
        match pin {
            ControlPin::Reset => drive(self.rst.as_mut(), level).map_err(I2cBusError::Pin),
            ControlPin::Backlight => drive(self.bl.as_mut(), level).map_err(I2cBusError::Pin),
            ControlPin::DataCommand | ControlPin::ChipSelect => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::vec;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x3C;

    type TestBus = I2cPanelBus<I2cMock, PinMock, NoopDelay>;

    fn bus(i2c: &I2cMock) -> TestBus {
        I2cPanelBus::new(i2c.clone(), ADDR, NoopDelay)
    }

    /// Expected data transfer: control byte followed by `payload`
    fn data_write(payload: &[u8]) -> I2cTransaction {
        let mut frame = vec![CONTROL_DATA];
        frame.extend_from_slice(payload);
        I2cTransaction::write(ADDR, frame)
    }

    #[test]
    fn test_command_uses_command_control_byte() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write(ADDR, vec![CONTROL_COMMAND, 0xAF])]);
        bus(&i2c).write_cmd(0xAF).unwrap();
        i2c.done();
    }

    #[test]
    fn test_data_is_split_into_chunks() {
        let mut i2c = I2cMock::new(&[
            data_write(&[0x55; 16]),
            data_write(&[0x55; 16]),
            data_write(&[0x55; 8]),
        ]);
        bus(&i2c).write_data(&[0x55; 40]).unwrap();
        i2c.done();
    }

    #[test]
    fn test_write_repeat_fills_chunks() {
        let mut i2c = I2cMock::new(&[data_write(&[0xFF; 16]), data_write(&[0xFF; 4])]);
        bus(&i2c).write_repeat(&[0xFF], 20).unwrap();
        i2c.done();
    }

    #[test]
    fn test_rgb565_streaming_unsupported() {
        let mut i2c = I2cMock::new(&[]);
        let result = bus(&i2c).write_pixels(&[0, 0], 1, WireFormat::Rgb565);
        assert!(matches!(result, Err(I2cBusError::Unsupported)));
        i2c.done();
    }

    #[test]
    fn test_mono_pixels_forwarded_as_data() {
        let mut i2c = I2cMock::new(&[data_write(&[0b1010_0000])]);
        bus(&i2c)
            .write_pixels(&[0b1010_0000, 0xFF], 8, WireFormat::Mono1)
            .unwrap();
        i2c.done();
    }

    #[test]
    fn test_short_mono_buffer_rejected() {
        let mut i2c = I2cMock::new(&[]);
        let result = bus(&i2c).write_pixels(&[0xFF], 16, WireFormat::Mono1);
        assert!(matches!(result, Err(I2cBusError::Length)));
        i2c.done();
    }

    #[test]
    fn test_transport_error_propagates() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![CONTROL_COMMAND, 0xAE]).with_error(ErrorKind::Other)
        ]);
        let result = bus(&i2c).write_cmd(0xAE);
        assert!(matches!(result, Err(I2cBusError::I2c(ErrorKind::Other))));
        i2c.done();
    }

    #[test]
    fn test_begin_raises_reset_and_backlight() {
        let mut i2c = I2cMock::new(&[]);
        let mut rst = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let mut bl = PinMock::new(&[PinTransaction::set(PinState::High)]);

        bus(&i2c)
            .with_reset(rst.clone())
            .with_backlight(bl.clone())
            .begin()
            .unwrap();

        i2c.done();
        rst.done();
        bl.done();
    }

    #[test]
    fn test_release_returns_pins() {
        let mut i2c = I2cMock::new(&[]);
        let mut rst = PinMock::new(&[]);

        let (_i2c, released_rst, bl, _delay) = bus(&i2c).with_reset(rst.clone()).release();
        assert!(released_rst.is_some());
        assert!(bl.is_none());

        i2c.done();
        rst.done();
    }
}
