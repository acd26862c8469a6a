//! SSD1306 OLED Display Driver
//!
//! A driver for the SSD1306 monochrome OLED controller on an I2C bus,
//! supporting panels up to 128x64 pixels.
//!
//! ## Features
//!
//! - `no_std` compatible, no allocator needed
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Linux `/dev/i2c-N` sessions (with `linux` feature)
//! - C-compatible entry points (with `ffi` feature)
//! - Configurable dimensions, column offset and VCC source
//! - Bus faults detected and recoverable
//!
//! ## Usage
//!
//! ```rust,no_run
//! use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
//! use ssd1306_i2c::{Builder, Dimensions, Display, I2cInterface};
//!
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = ErrorKind; }
//! # impl I2c<SevenBitAddress> for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # let i2c = MockI2c;
//! let dims = match Dimensions::new(128, 64) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).address(0x3C).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let interface = I2cInterface::new(i2c, config.address);
//! let mut display = match Display::open(interface, config) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//! let _ = display.set_pixel(10, 10, true);
//! let _ = display.flush();
//! let _ = display.close();
//! ```

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

/// SSD1306 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Display session
pub mod display;
/// Error types for the driver
pub mod error;
/// Page-ordered frame buffer
pub mod framebuffer;
/// Hardware interface abstraction
pub mod interface;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

/// C-compatible entry points (requires `ffi` feature)
#[cfg(feature = "ffi")]
pub mod ffi;

pub use command::{AddressingMode, CommandSequence, ScrollDirection, ScrollInterval};
pub use config::{
    ALTERNATE_ADDRESS, Builder, Config, DEFAULT_ADDRESS, Dimensions, MAX_HEIGHT, MAX_WIDTH,
    MIN_HEIGHT, VccSource,
};
pub use display::{Display, State};
pub use error::{BuilderError, Error, OutOfBounds, ParameterError};
pub use framebuffer::{Bitmap, FrameBuffer};
pub use interface::{DisplayInterface, I2cInterface, InterfaceError};

#[cfg(feature = "linux")]
pub use display::LinuxDisplay;
