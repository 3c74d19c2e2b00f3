//! Dirty-rectangle presentation
//!
//! The presenter turns a framebuffer's dirty tiles into as few panel
//! transfers as possible. Each tile row is scanned left to right and every
//! run of adjacent dirty tiles becomes one window. Pixels are converted to
//! RGB565 through a fixed scratch line, so transient memory does not depend
//! on panel or framebuffer size.

mod presenter;
mod stats;

pub use presenter::Presenter;
pub use stats::PresentStats;
