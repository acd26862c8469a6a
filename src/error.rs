//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! the pure building blocks ([`ParameterError`], [`OutOfBounds`]) and session
//! operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`ParameterError`] - Controller argument outside its documented range
//! - [`OutOfBounds`] - Pixel or blit outside the frame buffer
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level bus errors
//!
//! ## Example
//!
//! ```
//! use ssd1306_i2c::{Builder, BuilderError, Dimensions};
//!
//! // Address outside the 7-bit range
//! let result = Builder::new().address(0x80).build();
//! assert!(matches!(result, Err(BuilderError::InvalidAddress(0x80))));
//!
//! // Height must be a whole number of pages
//! let result = Dimensions::new(128, 60);
//! assert!(result.is_err());
//! ```

use crate::config::{MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT};
use crate::display::State;
use crate::interface::DisplayInterface;

/// A controller argument outside its documented range
///
/// Returned by the [`command`](crate::command) encoders instead of clamping,
/// so malformed command bytes never reach the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterError {
    /// Name of the rejected argument
    pub parameter: &'static str,
    /// Value that was provided
    pub value: u32,
    /// Smallest accepted value
    pub min: u32,
    /// Largest accepted value
    pub max: u32,
}

impl ParameterError {
    /// Check `value` against an inclusive range
    pub(crate) fn check(parameter: &'static str, value: u32, min: u32, max: u32) -> Result<(), Self> {
        if value < min || value > max {
            return Err(Self {
                parameter,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Invalid {}: {} (expected {}..={})",
            self.parameter, self.value, self.min, self.max
        )
    }
}

impl core::error::Error for ParameterError {}

/// A pixel or rectangle that does not fit inside the frame buffer
///
/// Single pixels are reported with a 1x1 size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBounds {
    /// X coordinate of the rejected area
    pub x: u32,
    /// Y coordinate of the rejected area
    pub y: u32,
    /// Width of the rejected area
    pub w: u32,
    /// Height of the rejected area
    pub h: u32,
}

impl core::fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let Self { x, y, w, h } = self;
        write!(f, "Out of bounds: x={x}, y={y}, w={w}, h={h}")
    }
}

impl core::error::Error for OutOfBounds {}

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying bus error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// The bus device could not be opened or the address did not acknowledge
    BusOpen(I::Error),
    /// A write failed (NAK, short write, I/O error)
    ///
    /// The session that saw it is now [`State::Faulted`].
    BusWrite(I::Error),
    /// A write failed while running the power-on sequence
    Init(I::Error),
    /// A controller argument was out of range
    Parameter(ParameterError),
    /// A pixel or blit fell outside the frame buffer
    OutOfBounds(OutOfBounds),
    /// The operation needs a [`State::Ready`] session
    InvalidState(State),
    /// A previous bus failure faulted the session
    ///
    /// Call [`Display::reinit`](crate::Display::reinit) to recover.
    SessionFaulted,
}

impl<I: DisplayInterface> From<ParameterError> for Error<I> {
    fn from(err: ParameterError) -> Self {
        Self::Parameter(err)
    }
}

impl<I: DisplayInterface> From<OutOfBounds> for Error<I> {
    fn from(err: OutOfBounds) -> Self {
        Self::OutOfBounds(err)
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusOpen(e) => write!(f, "Failed to open bus: {e:?}"),
            Self::BusWrite(e) => write!(f, "Bus write failed: {e:?}"),
            Self::Init(e) => write!(f, "Display initialization failed: {e:?}"),
            Self::Parameter(e) => write!(f, "{e}"),
            Self::OutOfBounds(e) => write!(f, "{e}"),
            Self::InvalidState(state) => {
                write!(f, "Operation not allowed in {state} state")
            }
            Self::SessionFaulted => write!(f, "Session faulted by an earlier bus error"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is opened.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width in pixels requested
        width: u16,
        /// Height in pixels requested
        height: u16,
    },
    /// Bus address does not fit in 7 bits
    InvalidAddress(u8),
    /// Column offset pushes the panel past the last controller column
    ColumnOffsetOverflow {
        /// Requested column offset
        offset: u8,
        /// Panel width
        width: u16,
    },
    /// A register value is out of range
    Parameter(ParameterError),
}

impl From<ParameterError> for BuilderError {
    fn from(err: ParameterError) -> Self {
        Self::Parameter(err)
    }
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_WIDTH}x{MAX_HEIGHT}, height must be a multiple of 8, at least {MIN_HEIGHT})"
            ),
            Self::InvalidAddress(address) => {
                write!(f, "Invalid I2C address {address:#04x} (must be 7-bit)")
            }
            Self::ColumnOffsetOverflow { offset, width } => write!(
                f,
                "Column offset {offset} with width {width} exceeds {MAX_WIDTH} columns"
            ),
            Self::Parameter(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for BuilderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_check_bounds_are_inclusive() {
        assert!(ParameterError::check("page", 0, 0, 7).is_ok());
        assert!(ParameterError::check("page", 7, 0, 7).is_ok());
        assert_eq!(
            ParameterError::check("page", 8, 0, 7),
            Err(ParameterError {
                parameter: "page",
                value: 8,
                min: 0,
                max: 7
            })
        );
    }

    #[test]
    fn test_parameter_error_display_names_parameter() {
        use std::string::ToString;

        let err = ParameterError {
            parameter: "start line",
            value: 64,
            min: 0,
            max: 63,
        };
        assert_eq!(err.to_string(), "Invalid start line: 64 (expected 0..=63)");
    }
}
