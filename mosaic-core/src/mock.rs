//! Recording panel driver for host tests
//!
//! [`RecordingDriver`] keeps a log of every call, renders pixel streams into
//! an in-memory RGB565 panel image and can be told to fail a specific
//! `set_window` or `write_pixels` call.

use alloc::vec;
use alloc::vec::Vec;

use mosaic_hal::WireFormat;

use crate::color::Rgba8;
use crate::device::Rotation;
use crate::error::Error;
use crate::geometry::Window;
use crate::traits::{Capabilities, PanelDriver};

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Init,
    SetRotation(Rotation),
    SetWindow(Window),
    WritePixels { count: usize, format: WireFormat },
    FillRect(Window, Rgba8),
    Present,
    Power(bool),
    Invert(bool),
    Brightness(u8),
}

/// Error returned by an injected failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFault;

/// In-memory panel driver
pub struct RecordingDriver {
    native: (u16, u16),
    caps: Capabilities,
    rotation: Rotation,
    calls: Vec<DriverCall>,
    panel: Vec<u16>,
    window: Option<Window>,
    cursor: usize,
    last_bytes: Vec<u8>,
    set_window_calls: usize,
    write_calls: usize,
    fail_set_window_at: Option<usize>,
    fail_write_at: Option<usize>,
}

impl RecordingDriver {
    /// Windowed panel of `width` x `height` pixels at rotation 0
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            native: (width, height),
            caps: Capabilities::WINDOWED,
            rotation: Rotation::Deg0,
            calls: Vec::new(),
            panel: vec![0; usize::from(width) * usize::from(height)],
            window: None,
            cursor: 0,
            last_bytes: Vec::new(),
            set_window_calls: 0,
            write_calls: 0,
            fail_set_window_at: None,
            fail_write_at: None,
        }
    }

    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Fail the `n`th `set_window` call from now (1-based)
    pub fn fail_set_window_on(&mut self, n: usize) {
        self.fail_set_window_at = Some(self.set_window_calls + n);
    }

    /// Fail the `n`th `write_pixels` call from now (1-based)
    pub fn fail_write_on(&mut self, n: usize) {
        self.fail_write_at = Some(self.write_calls + n);
    }

    pub fn clear_faults(&mut self) {
        self.fail_set_window_at = None;
        self.fail_write_at = None;
    }

    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Windows passed to `set_window`, in order
    pub fn windows(&self) -> Vec<Window> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DriverCall::SetWindow(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// Total pixels received through `write_pixels`
    pub fn pixels_written(&self) -> usize {
        self.calls
            .iter()
            .map(|c| match c {
                DriverCall::WritePixels { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }

    /// Bytes of the most recent `write_pixels` call
    pub fn last_bytes(&self) -> &[u8] {
        &self.last_bytes
    }

    /// Panel size in the current rotation
    pub fn logical_size(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.native.1, self.native.0)
        } else {
            self.native
        }
    }

    /// RGB565 value shown at (`x`, `y`) in the current rotation
    pub fn panel_pixel(&self, x: u16, y: u16) -> Option<u16> {
        let (w, h) = self.logical_size();
        (x < w && y < h).then(|| self.panel[usize::from(y) * usize::from(w) + usize::from(x)])
    }

    fn put(&mut self, value: u16) {
        let Some(win) = self.window else {
            return;
        };
        let area = win.area() as usize;
        if area == 0 {
            return;
        }
        let offset = self.cursor % area;
        let x = usize::from(win.x) + offset % usize::from(win.w);
        let y = usize::from(win.y) + offset / usize::from(win.w);
        let width = usize::from(self.logical_size().0);
        if let Some(px) = self.panel.get_mut(y * width + x) {
            *px = value;
        }
        self.cursor += 1;
    }
}

impl PanelDriver for RecordingDriver {
    type Error = InjectedFault;

    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn size(&self) -> (u16, u16) {
        self.native
    }

    fn init(&mut self) -> Result<(), InjectedFault> {
        self.calls.push(DriverCall::Init);
        Ok(())
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), InjectedFault> {
        self.calls.push(DriverCall::SetRotation(rotation));
        self.rotation = rotation;
        self.panel.fill(0);
        Ok(())
    }

    fn set_window(&mut self, window: Window) -> Result<(), InjectedFault> {
        self.calls.push(DriverCall::SetWindow(window));
        self.set_window_calls += 1;
        if self.fail_set_window_at == Some(self.set_window_calls) {
            return Err(InjectedFault);
        }
        self.window = Some(window);
        self.cursor = 0;
        Ok(())
    }

    fn write_pixels(
        &mut self,
        data: &[u8],
        count: usize,
        format: WireFormat,
    ) -> Result<(), InjectedFault> {
        self.calls.push(DriverCall::WritePixels { count, format });
        self.write_calls += 1;
        if self.fail_write_at == Some(self.write_calls) {
            return Err(InjectedFault);
        }
        self.last_bytes = data[..format.byte_len(count).min(data.len())].to_vec();

        match format {
            WireFormat::Rgb565 => {
                for px in data.chunks_exact(2).take(count) {
                    self.put(u16::from_be_bytes([px[0], px[1]]));
                }
            }
            WireFormat::Mono1 => {
                for i in 0..count {
                    let Some(&byte) = data.get(i / 8) else {
                        break;
                    };
                    let on = byte & (0x80 >> (i % 8)) != 0;
                    self.put(if on { 0xFFFF } else { 0x0000 });
                }
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, window: Window, color: Rgba8) -> Result<(), Error<InjectedFault>> {
        if !self.caps.hw_fill {
            return Err(Error::Unsupported);
        }
        self.calls.push(DriverCall::FillRect(window, color));
        let width = usize::from(self.logical_size().0);
        let value = color.to_rgb565();
        for y in window.y..window.y + window.h {
            let row = usize::from(y) * width;
            for x in window.x..window.x + window.w {
                if let Some(px) = self.panel.get_mut(row + usize::from(x)) {
                    *px = value;
                }
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), InjectedFault> {
        self.calls.push(DriverCall::Present);
        Ok(())
    }

    fn power(&mut self, on: bool) -> Result<(), Error<InjectedFault>> {
        self.calls.push(DriverCall::Power(on));
        Ok(())
    }

    fn invert(&mut self, on: bool) -> Result<(), Error<InjectedFault>> {
        if !self.caps.invert {
            return Err(Error::Unsupported);
        }
        self.calls.push(DriverCall::Invert(on));
        Ok(())
    }

    fn brightness(&mut self, percent: u8) -> Result<(), Error<InjectedFault>> {
        self.calls.push(DriverCall::Brightness(percent));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_wraps_inside_window() {
        let mut drv = RecordingDriver::new(8, 8);
        drv.set_window(Window::new(2, 2, 2, 2)).unwrap();
        drv.write_pixels(&[0x12, 0x34, 0x56, 0x78], 2, WireFormat::Rgb565)
            .unwrap();
        drv.write_pixels(&[0xAB, 0xCD], 1, WireFormat::Rgb565)
            .unwrap();

        assert_eq!(drv.panel_pixel(2, 2), Some(0x1234));
        assert_eq!(drv.panel_pixel(3, 2), Some(0x5678));
        assert_eq!(drv.panel_pixel(2, 3), Some(0xABCD));
        assert_eq!(drv.pixels_written(), 3);
    }

    #[test]
    fn test_mono_stream_msb_first() {
        let mut drv = RecordingDriver::new(8, 1);
        drv.set_window(Window::new(0, 0, 8, 1)).unwrap();
        drv.write_pixels(&[0b1000_0001], 8, WireFormat::Mono1).unwrap();

        assert_eq!(drv.panel_pixel(0, 0), Some(0xFFFF));
        assert_eq!(drv.panel_pixel(1, 0), Some(0x0000));
        assert_eq!(drv.panel_pixel(7, 0), Some(0xFFFF));
    }

    #[test]
    fn test_fault_fires_once_at_requested_call() {
        let mut drv = RecordingDriver::new(4, 4);
        let win = Window::new(0, 0, 1, 1);
        drv.fail_set_window_on(2);

        assert_eq!(drv.set_window(win), Ok(()));
        assert_eq!(drv.set_window(win), Err(InjectedFault));
        assert_eq!(drv.set_window(win), Ok(()));
    }

    #[test]
    fn test_rotation_swaps_logical_size() {
        let mut drv = RecordingDriver::new(8, 4);
        drv.set_rotation(Rotation::Deg90).unwrap();
        assert_eq!(drv.logical_size(), (4, 8));
        assert_eq!(drv.panel_pixel(3, 7), Some(0));
        assert_eq!(drv.panel_pixel(7, 3), None);
    }
}
