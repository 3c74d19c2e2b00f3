//! Board-agnostic graphics core for small MCU displays
//!
//! This crate contains everything between "the application drew something"
//! and "bytes go out on the panel bus":
//!
//! - Pixel formats and RGB565 packing
//! - Off-screen framebuffer with a per-tile dirty/checksum grid
//! - Clipped drawing primitives and alpha-mask compositing
//! - The presenter, which coalesces dirty tiles into rectangles and streams
//!   them through a bounded scratch line
//! - The panel driver contract and a device handle for direct drawing
//! - Configuration type definitions
//!
//! Panel command sets and bus transports live outside this crate; they meet
//! it through [`traits::PanelDriver`] and [`mosaic_hal::PanelBus`].
//!
//! # Usage
//!
//! ```ignore
//! let mut fb = PixelBuffer::<Rgb565>::new(240, 240, 16, 16)?;
//! let mut presenter = Presenter::new(240)?;
//!
//! fb.fill_rect(10, 10, 50, 20, Rgba8::WHITE);
//! presenter.present_frame(&mut driver, &mut fb)?;
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod color;
pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod framebuffer;
pub mod geometry;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod present;
pub mod traits;

pub use color::{pack_rgb565, unpack_rgb565, Rgba8};
pub use device::{Device, Rotation};
pub use error::Error;
pub use format::{NativeFormat, Rgb565, Rgba8888};
pub use framebuffer::{AlphaMask, PixelBuffer, TileState};
pub use geometry::{Rect, Window};
pub use mosaic_hal::WireFormat;
pub use present::{PresentStats, Presenter};
pub use traits::{Capabilities, PanelDriver};
