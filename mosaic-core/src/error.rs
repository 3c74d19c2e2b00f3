//! Error type shared by buffer, presenter and device operations

use core::convert::Infallible;

/// Errors reported by the graphics core
///
/// `E` is the transport error of the panel driver in use. Operations that
/// never touch a driver (allocation, argument checks) use the default
/// `Error<Infallible>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E = Infallible> {
    /// Malformed dimensions or zero capacity
    InvalidArgument,
    /// Allocation failed; nothing was kept
    OutOfMemory,
    /// The driver lacks a capability the operation needs
    Unsupported,
    /// Error raised by the driver or bus, forwarded unchanged
    Transport(E),
}

impl Error {
    /// Reinterpret a driver-independent error in the context of driver error `E`
    pub fn widen<E>(self) -> Error<E> {
        match self {
            Self::InvalidArgument => Error::InvalidArgument,
            Self::OutOfMemory => Error::OutOfMemory,
            Self::Unsupported => Error::Unsupported,
            Self::Transport(never) => match never {},
        }
    }
}

impl<E> Error<E> {
    /// Check if the error came from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::OutOfMemory => f.write_str("out of memory"),
            Self::Unsupported => f.write_str("unsupported by driver"),
            Self::Transport(e) => write!(f, "transport error: {e:?}"),
        }
    }
}
