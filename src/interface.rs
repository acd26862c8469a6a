//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`I2cInterface`]
//! struct for communicating with the SSD1306 controller over I2C.
//!
//! ## Bus Framing
//!
//! Every write is one I2C transaction addressed to the display:
//! - `0x00` control byte, then command bytes
//! - `0x40` control byte, then display RAM bytes
//!
//! Long payloads are split into chunks of [`DATA_CHUNK_SIZE`] bytes, each
//! written with its own control byte.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
//! use ssd1306_i2c::{DisplayInterface, I2cInterface};
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
//! let mut interface = I2cInterface::new(MockI2c, 0x3C);
//!
//! // Display off
//! let _ = interface.send_commands(&[0xAE]);
//!
//! // Send RAM data
//! let _ = interface.send_data(&[0xFF, 0x00, 0xFF]);
//!
//! // Drop the bus
//! interface.release();
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::I2c;

use crate::command;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Control byte announcing a command stream
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte announcing display RAM data
pub const CONTROL_DATA: u8 = 0x40;

/// Largest payload written in one I2C transaction
///
/// One page row of a 128-column panel.
pub const DATA_CHUNK_SIZE: usize = 128;

/// Trait for hardware interface to SSD1306 controller
///
/// This trait abstracts over different bus implementations, allowing the
/// [`Display`](crate::display::Display) to work with any transport. Every
/// call blocks until the bus transaction completes or fails.
///
/// ## Implementing
///
/// For most cases, use the provided [`I2cInterface`] struct. Implement this
/// trait yourself to drive the controller over another bus or to capture
/// traffic in tests.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send command bytes (with their arguments) to the controller
    ///
    /// # Errors
    ///
    /// Returns an error on NAK, short write or other bus failure.
    fn send_commands(&mut self, commands: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Send display RAM bytes to the controller
    ///
    /// # Errors
    ///
    /// Returns an error on NAK, short write or other bus failure.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Release the underlying bus
    ///
    /// Must be idempotent. Sends after release fail.
    fn release(&mut self);
}

/// Errors that can occur at the interface level
///
/// Generic over the I2C error type.
#[derive(Debug)]
pub enum InterfaceError<E> {
    /// I2C bus error (NAK, arbitration loss, I/O error)
    Bus(E),
    /// The bus handle has already been released
    Closed,
}

impl<E: Debug> core::fmt::Display for InterfaceError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "I2C error: {e:?}"),
            Self::Closed => write!(f, "Bus handle is closed"),
        }
    }
}

impl<E: Debug> core::error::Error for InterfaceError<E> {}

/// I2C interface implementation for SSD1306
///
/// Owns the bus exclusively and addresses a single 7-bit device.
///
/// ## Type Parameters
///
/// * `I2C` - Bus implementing [`I2c`]
pub struct I2cInterface<I2C> {
    /// I2C bus, `None` once released
    i2c: Option<I2C>,
    /// 7-bit device address
    address: u8,
}

impl<I2C: I2c> I2cInterface<I2C> {
    /// Create a new interface for the device at `address`
    ///
    /// No bus traffic happens here; use [`probe`](Self::probe) to check that
    /// the device answers.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c: Some(i2c),
            address,
        }
    }

    /// The 7-bit device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether the bus is still held
    pub fn is_open(&self) -> bool {
        self.i2c.is_some()
    }

    /// Check that the device acknowledges its address
    ///
    /// Sends a controller NOP, which leaves display state untouched.
    pub fn probe(&mut self) -> InterfaceResult<(), InterfaceError<I2C::Error>> {
        self.write_prefixed(CONTROL_COMMAND, command::nop().as_bytes())
    }

    /// Release the interface and hand back the bus, if still held
    pub fn into_inner(mut self) -> Option<I2C> {
        self.i2c.take()
    }

    fn write_prefixed(
        &mut self,
        control: u8,
        bytes: &[u8],
    ) -> InterfaceResult<(), InterfaceError<I2C::Error>> {
        let address = self.address;
        let i2c = self.i2c.as_mut().ok_or(InterfaceError::Closed)?;

        let mut buf = [0u8; DATA_CHUNK_SIZE + 1];
        buf[0] = control;
        for chunk in bytes.chunks(DATA_CHUNK_SIZE) {
            buf[1..=chunk.len()].copy_from_slice(chunk);
            i2c.write(address, &buf[..=chunk.len()])
                .map_err(InterfaceError::Bus)?;
        }
        Ok(())
    }
}

impl<I2C> Debug for I2cInterface<I2C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("I2cInterface")
            .field("address", &self.address)
            .field("open", &self.i2c.is_some())
            .finish_non_exhaustive()
    }
}

impl<I2C: I2c> DisplayInterface for I2cInterface<I2C> {
    type Error = InterfaceError<I2C::Error>;

    fn send_commands(&mut self, commands: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.write_prefixed(CONTROL_COMMAND, commands)
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.write_prefixed(CONTROL_DATA, data)
    }

    fn release(&mut self) {
        self.i2c = None;
    }
}

#[cfg(feature = "linux")]
mod linux {
    use super::{I2cInterface, InterfaceError};
    use linux_embedded_hal::{I2CError, I2cdev};

    impl I2cInterface<I2cdev> {
        /// Open a Linux I2C device node (e.g. `/dev/i2c-1`) for `address`
        ///
        /// # Errors
        ///
        /// Fails if the node cannot be opened or the device does not
        /// acknowledge a probe.
        pub fn open<P: AsRef<std::path::Path>>(
            path: P,
            address: u8,
        ) -> Result<Self, InterfaceError<I2CError>> {
            let i2c = I2cdev::new(path).map_err(|e| InterfaceError::Bus(I2CError::from(e)))?;
            let mut interface = Self::new(i2c, address);
            interface.probe()?;
            log::debug!("opened I2C display at {address:#04x}");
            Ok(interface)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use std::vec::Vec;

    #[derive(Debug, Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_commands_use_command_control_byte() {
        let mut interface = I2cInterface::new(MockI2c::default(), 0x3C);
        interface.send_commands(&[0x81, 0x7F]).unwrap();
        let bus = interface.into_inner().unwrap();
        assert_eq!(bus.writes, [(0x3C, std::vec![0x00, 0x81, 0x7F])]);
    }

    #[test]
    fn test_data_uses_data_control_byte() {
        let mut interface = I2cInterface::new(MockI2c::default(), 0x3D);
        interface.send_data(&[1, 2, 3]).unwrap();
        let bus = interface.into_inner().unwrap();
        assert_eq!(bus.writes, [(0x3D, std::vec![0x40, 1, 2, 3])]);
    }

    #[test]
    fn test_long_data_is_chunked() {
        let mut interface = I2cInterface::new(MockI2c::default(), 0x3C);
        let data = [0xAAu8; 300];
        interface.send_data(&data).unwrap();
        let bus = interface.into_inner().unwrap();

        let lengths: Vec<usize> = bus.writes.iter().map(|(_, w)| w.len()).collect();
        assert_eq!(lengths, [129, 129, 45]);
        assert!(bus.writes.iter().all(|(_, w)| w[0] == CONTROL_DATA));
    }

    #[test]
    fn test_empty_payload_writes_nothing() {
        let mut interface = I2cInterface::new(MockI2c::default(), 0x3C);
        interface.send_data(&[]).unwrap();
        assert!(interface.into_inner().unwrap().writes.is_empty());
    }

    #[test]
    fn test_probe_sends_nop() {
        let mut interface = I2cInterface::new(MockI2c::default(), 0x3C);
        interface.probe().unwrap();
        let bus = interface.into_inner().unwrap();
        assert_eq!(bus.writes, [(0x3C, std::vec![0x00, 0xE3])]);
    }

    #[test]
    fn test_nak_surfaces_as_bus_error() {
        let bus = MockI2c {
            fail: true,
            ..MockI2c::default()
        };
        let mut interface = I2cInterface::new(bus, 0x3C);
        assert!(matches!(
            interface.probe(),
            Err(InterfaceError::Bus(ErrorKind::NoAcknowledge(_)))
        ));
    }

    #[test]
    fn test_release_is_idempotent_and_blocks_writes() {
        let mut interface = I2cInterface::new(MockI2c::default(), 0x3C);
        assert!(interface.is_open());
        interface.release();
        interface.release();
        assert!(!interface.is_open());
        assert!(matches!(
            interface.send_commands(&[0xAF]),
            Err(InterfaceError::Closed)
        ));
        assert!(matches!(
            interface.send_data(&[0x00]),
            Err(InterfaceError::Closed)
        ));
    }
}
