//! Hardware abstraction traits
//!
//! These traits define the interface between the graphics core and
//! panel-specific implementations.

pub mod driver;

pub use driver::{Capabilities, PanelDriver};
