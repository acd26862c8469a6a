//! Display session: power-on sequence, frame buffer, flush and control
//!
//! A [`Display`] owns its interface, configuration and frame buffer. It
//! moves through these states:
//!
//! ```text
//! Closed -> Initializing -> Ready -> Closed
//!                             |
//!                             v
//!                          Faulted --reinit--> Ready
//! ```
//!
//! Any bus failure while Ready faults the session: the controller may be
//! out of step with what the driver believes, so every later operation is
//! refused with [`Error::SessionFaulted`] until [`Display::reinit`] succeeds.

use crate::command::{self, AddressingMode, CommandSequence, ScrollDirection, ScrollInterval};
use crate::config::{Config, Dimensions, MAX_WIDTH};
use crate::error::{Error, ParameterError};
use crate::framebuffer::{Bitmap, FrameBuffer};
use crate::interface::DisplayInterface;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// VCOMH deselect level used at power-on (~0.77 x Vcc)
pub const VCOMH_DESELECT_LEVEL: u8 = 0x40;

/// Session lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Transport released, nothing can be sent
    Closed,
    /// Power-on sequence in progress
    Initializing,
    /// Accepting operations
    Ready,
    /// A bus write failed; only `reinit` or `close` are accepted
    Faulted,
}

impl core::fmt::Display for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Display session for one SSD1306 controller
///
/// Dropping the session closes it.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Pixels waiting to be flushed
    buffer: FrameBuffer,
    /// Lifecycle state
    state: State,
    /// Whether the panel is switched on
    is_display_on: bool,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Initialize the controller and return a Ready session
    ///
    /// Runs the power-on sequence and allocates a zeroed frame buffer. The
    /// panel keeps showing whatever its RAM held until the first
    /// [`flush`](Self::flush).
    ///
    /// # Errors
    ///
    /// - [`Error::Init`] if a write fails during the power-on sequence
    /// - [`Error::Parameter`] if `config` holds out-of-range register values
    ///   or a column offset that pushes the panel past column 127
    pub fn open(interface: I, config: Config) -> Result<Self, Error<I>> {
        let mut display = Self {
            interface,
            buffer: FrameBuffer::new(config.dimensions),
            config,
            state: State::Initializing,
            is_display_on: false,
        };
        display.init()?;
        display.state = State::Ready;
        log::debug!(
            "SSD1306 {}x{} at {:#04x} ready",
            display.config.dimensions.width(),
            display.config.dimensions.height(),
            display.config.address
        );
        Ok(display)
    }

    /// Issue the power-on command sequence
    fn init(&mut self) -> DisplayResult<I> {
        let config = &self.config;
        let free_columns = MAX_WIDTH - config.dimensions.width();
        ParameterError::check(
            "column offset",
            config.column_offset as u32,
            0,
            free_columns as u32,
        )?;
        let (phase1, phase2) = config.precharge();
        let sequence = [
            command::power_off(),
            command::set_clock(config.clock_divide, config.oscillator_frequency)?,
            command::set_multiplex_ratio(config.dimensions.height() as u8)?,
            command::set_display_offset(config.display_offset)?,
            command::set_start_line(0)?,
            command::set_charge_pump(config.charge_pump()),
            command::set_addressing_mode(AddressingMode::Horizontal),
            command::set_segment_remap(config.segment_remap),
            command::set_com_scan_direction(config.com_scan_reversed),
            command::set_com_pins(config.com_alternative, config.com_left_right_remap),
            command::set_contrast(config.contrast),
            command::set_precharge(phase1, phase2)?,
            command::set_vcomh_deselect(VCOMH_DESELECT_LEVEL)?,
            command::entire_display_on(false),
            command::invert_display(false),
            command::deactivate_scroll(),
            command::power_on(),
        ];

        for cmd in &sequence {
            self.interface
                .send_commands(cmd.as_bytes())
                .map_err(Error::Init)?;
        }
        self.is_display_on = true;
        Ok(())
    }

    /// Rerun the power-on sequence on the same interface
    ///
    /// This is how a Faulted session is recovered. Frame buffer contents
    /// are kept; call [`flush`](Self::flush) afterwards to redraw.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] for a Closed session, or
    /// [`Error::Init`] if the sequence fails (the session stays Faulted).
    pub fn reinit(&mut self) -> DisplayResult<I> {
        if self.state == State::Closed {
            return Err(Error::InvalidState(State::Closed));
        }
        self.state = State::Initializing;
        if let Err(err) = self.init() {
            self.state = State::Faulted;
            return Err(err);
        }
        self.state = State::Ready;
        Ok(())
    }

    /// Write the whole frame buffer to display RAM
    ///
    /// Sets the column and page window to the full panel, then sends the
    /// buffer in one data write.
    ///
    /// # Errors
    ///
    /// [`Error::BusWrite`] faults the session.
    pub fn flush(&mut self) -> DisplayResult<I> {
        self.ensure_ready()?;

        let last_column = self.config.last_column();
        ParameterError::check("column end", last_column as u32, 0, 127)?;
        let pages = self.config.dimensions.pages() as u8;
        let columns = command::set_column_range(self.config.column_offset, last_column as u8)?;
        let page_range = command::set_page_range(0, pages - 1)?;

        self.send_command(columns)?;
        self.send_command(page_range)?;

        log::trace!("flushing {} bytes", self.buffer.as_bytes().len());
        let result = self.interface.send_data(self.buffer.as_bytes());
        result.map_err(|e| self.fault(e))
    }

    /// Set contrast (0-255)
    pub fn set_contrast(&mut self, level: u8) -> DisplayResult<I> {
        self.send_command(command::set_contrast(level))
    }

    /// Invert (or restore) all pixels without touching RAM
    pub fn invert(&mut self, invert: bool) -> DisplayResult<I> {
        self.send_command(command::invert_display(invert))
    }

    /// Switch the panel off; RAM and session state are kept
    pub fn power_off(&mut self) -> DisplayResult<I> {
        self.send_command(command::power_off())?;
        self.is_display_on = false;
        Ok(())
    }

    /// Switch the panel back on
    pub fn power_on(&mut self) -> DisplayResult<I> {
        self.send_command(command::power_on())?;
        self.is_display_on = true;
        Ok(())
    }

    /// Scroll RAM vertically by starting the display at `line` (0-63)
    pub fn set_start_line(&mut self, line: u8) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.send_command(command::set_start_line(line)?)
    }

    /// Continuously scroll pages `start..=end` horizontally
    pub fn start_scroll(
        &mut self,
        direction: ScrollDirection,
        start: u8,
        end: u8,
        interval: ScrollInterval,
    ) -> DisplayResult<I> {
        self.ensure_ready()?;
        let setup = command::setup_horizontal_scroll(direction, start, end, interval)?;
        self.send_command(command::deactivate_scroll())?;
        self.send_command(setup)?;
        self.send_command(command::activate_scroll())
    }

    /// Stop scrolling and redraw the frame buffer
    ///
    /// Scrolling corrupts display RAM, so the buffer is flushed again.
    pub fn stop_scroll(&mut self) -> DisplayResult<I> {
        self.send_command(command::deactivate_scroll())?;
        self.flush()
    }

    /// Turn a buffer pixel on or off (takes effect on the next flush)
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.buffer.set_pixel(x, y, on)?;
        Ok(())
    }

    /// Copy a bitmap into the buffer; see [`FrameBuffer::blit`]
    pub fn blit(&mut self, bitmap: &Bitmap<'_>, x: u32, y: u32) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.buffer.blit(bitmap, x, y)?;
        Ok(())
    }

    /// Fill the buffer with on or off pixels
    pub fn clear(&mut self, on: bool) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.buffer.clear(on);
        Ok(())
    }

    /// Close the session
    ///
    /// Switches the panel off if the session is Ready, then releases the
    /// interface. Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BusWrite`] if the power-off command fails; the
    /// session is closed regardless.
    pub fn close(&mut self) -> DisplayResult<I> {
        if self.state == State::Closed {
            return Ok(());
        }

        let result = if self.state == State::Ready {
            self.interface
                .send_commands(command::power_off().as_bytes())
                .map_err(Error::BusWrite)
        } else {
            Ok(())
        };

        self.interface.release();
        self.state = State::Closed;
        self.is_display_on = false;

        if let Err(err) = &result {
            log::warn!("power off during close failed: {err}");
        }
        log::debug!("SSD1306 at {:#04x} closed", self.config.address);
        result
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the panel is switched on
    pub fn is_display_on(&self) -> bool {
        self.is_display_on
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read-only view of the frame buffer
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Mutable frame buffer access, e.g. for drawing with embedded-graphics
    pub fn buffer_mut(&mut self) -> Result<&mut FrameBuffer, Error<I>> {
        self.ensure_ready()?;
        Ok(&mut self.buffer)
    }

    fn ensure_ready(&self) -> DisplayResult<I> {
        match self.state {
            State::Ready => Ok(()),
            State::Faulted => Err(Error::SessionFaulted),
            state => Err(Error::InvalidState(state)),
        }
    }

    /// Send one command, faulting the session on bus failure
    fn send_command(&mut self, cmd: CommandSequence) -> DisplayResult<I> {
        self.ensure_ready()?;
        let result = self.interface.send_commands(cmd.as_bytes());
        result.map_err(|e| self.fault(e))
    }

    fn fault(&mut self, err: I::Error) -> Error<I> {
        log::warn!("bus write failed, session faulted: {err:?}");
        self.state = State::Faulted;
        Error::BusWrite(err)
    }
}

impl<I> Drop for Display<I>
where
    I: DisplayInterface,
{
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(feature = "linux")]
mod linux {
    use super::Display;
    use crate::config::Config;
    use crate::error::Error;
    use crate::interface::I2cInterface;
    use linux_embedded_hal::I2cdev;

    /// Session on a Linux `/dev/i2c-N` bus
    pub type LinuxDisplay = Display<I2cInterface<I2cdev>>;

    impl Display<I2cInterface<I2cdev>> {
        /// Open `bus_path` at `config.address` and initialize the display
        ///
        /// # Errors
        ///
        /// [`Error::BusOpen`] if the node is missing, access is denied or
        /// the address does not acknowledge; otherwise as [`Display::open`].
        pub fn open_linux<P: AsRef<std::path::Path>>(
            bus_path: P,
            config: Config,
        ) -> Result<Self, Error<I2cInterface<I2cdev>>> {
            let interface =
                I2cInterface::open(bus_path, config.address).map_err(Error::BusOpen)?;
            Self::open(interface, config)
        }
    }
}

#[cfg(feature = "linux")]
pub use linux::LinuxDisplay;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, VccSource};
    use std::vec;
    use std::vec::Vec;

    #[derive(Debug, Default)]
    struct MockInterface {
        commands: Vec<Vec<u8>>,
        data: Vec<Vec<u8>>,
        /// Number of successful sends before every send fails
        fail_after: Option<usize>,
        sends: usize,
        released: usize,
    }

    #[derive(Debug, PartialEq)]
    struct MockError;

    impl MockInterface {
        fn check(&mut self) -> Result<(), MockError> {
            self.sends += 1;
            match self.fail_after {
                Some(limit) if self.sends > limit => Err(MockError),
                _ => Ok(()),
            }
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = MockError;

        fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error> {
            self.check()?;
            self.commands.push(commands.to_vec());
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.check()?;
            self.data.push(data.to_vec());
            Ok(())
        }

        fn release(&mut self) {
            self.released += 1;
        }
    }

    const POWER_ON_128X64: [&[u8]; 17] = [
        &[0xAE],
        &[0xD5, 0x80],
        &[0xA8, 0x3F],
        &[0xD3, 0x00],
        &[0x40],
        &[0x8D, 0x14],
        &[0x20, 0x00],
        &[0xA1],
        &[0xC8],
        &[0xDA, 0x12],
        &[0x81, 0xCF],
        &[0xD9, 0xF1],
        &[0xDB, 0x40],
        &[0xA4],
        &[0xA6],
        &[0x2E],
        &[0xAF],
    ];

    fn open_display() -> Display<MockInterface> {
        Display::open(MockInterface::default(), Config::default()).unwrap()
    }

    /// Session whose interface fails after the power-on sequence plus `extra` sends
    fn open_failing_after(extra: usize) -> Display<MockInterface> {
        let interface = MockInterface {
            fail_after: Some(POWER_ON_128X64.len() + extra),
            ..MockInterface::default()
        };
        Display::open(interface, Config::default()).unwrap()
    }

    #[test]
    fn test_open_issues_power_on_sequence_in_order() {
        let display = open_display();
        assert_eq!(display.state(), State::Ready);
        assert!(display.is_display_on());
        assert_eq!(display.interface.commands, POWER_ON_128X64);
        assert!(display.interface.data.is_empty());
    }

    #[test]
    fn test_open_external_vcc_128x32() {
        let config = Builder::new()
            .dimensions(Dimensions::new(128, 32).unwrap())
            .vcc(VccSource::External)
            .build()
            .unwrap();
        let display = Display::open(MockInterface::default(), config).unwrap();
        let commands = &display.interface.commands;
        assert_eq!(commands[2], [0xA8, 0x1F]);
        assert_eq!(commands[5], [0x8D, 0x10]);
        assert_eq!(commands[9], [0xDA, 0x02]);
        assert_eq!(commands[10], [0x81, 0x9F]);
        assert_eq!(commands[11], [0xD9, 0x22]);
    }

    #[test]
    fn test_open_allocates_zeroed_buffer() {
        let display = open_display();
        assert_eq!(display.buffer().as_bytes(), &[0u8; 1024][..]);
    }

    #[test]
    fn test_open_failure_is_init_error() {
        let interface = MockInterface {
            fail_after: Some(3),
            ..MockInterface::default()
        };
        let result = Display::open(interface, Config::default());
        assert!(matches!(result, Err(Error::Init(MockError))));
    }

    #[test]
    fn test_open_rejects_invalid_hand_built_config() {
        let config = Config {
            display_offset: 64,
            ..Config::default()
        };
        let result = Display::open(MockInterface::default(), config);
        assert!(matches!(result, Err(Error::Parameter(_))));
    }

    #[test]
    fn test_open_rejects_hand_built_column_overflow() {
        let config = Config {
            dimensions: Dimensions::new(64, 48).unwrap(),
            column_offset: 65,
            ..Config::default()
        };
        let result = Display::open(MockInterface::default(), config);
        assert!(matches!(
            result,
            Err(Error::Parameter(ParameterError {
                parameter: "column offset",
                value: 65,
                max: 64,
                ..
            }))
        ));

        let config = Config {
            column_offset: 1,
            ..Config::default()
        };
        let result = Display::open(MockInterface::default(), config);
        assert!(matches!(result, Err(Error::Parameter(_))));
    }

    #[test]
    fn test_hand_built_config_cannot_outgrow_buffer() {
        // Dimensions only come from the validated constructor
        let config = Config {
            dimensions: Dimensions::new(200, 64).unwrap_or_default(),
            ..Config::default()
        };
        let mut display = Display::open(MockInterface::default(), config).unwrap();
        display.clear(true).unwrap();
        display.flush().unwrap();
        assert_eq!(display.interface.data[0].len(), 1024);
    }

    #[test]
    fn test_flush_sets_window_and_writes_buffer() {
        let mut display = open_display();
        display.set_pixel(0, 0, true).unwrap();
        display.flush().unwrap();

        let commands = &display.interface.commands[POWER_ON_128X64.len()..];
        assert_eq!(commands, [vec![0x21, 0x00, 0x7F], vec![0x22, 0x00, 0x07]]);
        assert_eq!(display.interface.data.len(), 1);
        assert_eq!(display.interface.data[0].len(), 1024);
        assert_eq!(display.interface.data[0][0], 0x01);
    }

    #[test]
    fn test_flush_uses_column_offset() {
        let config = Builder::new()
            .dimensions(Dimensions::new(64, 48).unwrap())
            .column_offset(32)
            .build()
            .unwrap();
        let mut display = Display::open(MockInterface::default(), config).unwrap();
        display.flush().unwrap();

        let commands = &display.interface.commands;
        let n = commands.len();
        assert_eq!(commands[n - 2], [0x21, 32, 95]);
        assert_eq!(commands[n - 1], [0x22, 0, 5]);
        assert_eq!(display.interface.data[0].len(), 6 * 64);
    }

    #[test]
    fn test_flush_failure_faults_session() {
        // Column and page commands succeed, data write fails
        let mut display = open_failing_after(2);
        let result = display.flush();
        assert!(matches!(result, Err(Error::BusWrite(MockError))));
        assert_eq!(display.state(), State::Faulted);

        let sends = display.interface.sends;
        assert!(matches!(display.flush(), Err(Error::SessionFaulted)));
        assert!(matches!(
            display.set_contrast(0x10),
            Err(Error::SessionFaulted)
        ));
        assert!(matches!(display.invert(true), Err(Error::SessionFaulted)));
        assert!(matches!(
            display.set_pixel(0, 0, true),
            Err(Error::SessionFaulted)
        ));
        // No bus traffic after the fault
        assert_eq!(display.interface.sends, sends);
    }

    #[test]
    fn test_command_failure_faults_session() {
        let mut display = open_failing_after(0);
        assert!(matches!(
            display.set_contrast(0x10),
            Err(Error::BusWrite(MockError))
        ));
        assert_eq!(display.state(), State::Faulted);
    }

    #[test]
    fn test_reinit_recovers_faulted_session() {
        let mut display = open_failing_after(0);
        display.set_pixel(1, 1, true).unwrap();
        let _ = display.flush();
        assert_eq!(display.state(), State::Faulted);

        display.interface.fail_after = None;
        display.interface.commands.clear();
        display.reinit().unwrap();
        assert_eq!(display.state(), State::Ready);
        assert_eq!(display.interface.commands, POWER_ON_128X64);
        // Buffer survives recovery
        assert_eq!(display.buffer().get_pixel(1, 1), Ok(true));
    }

    #[test]
    fn test_reinit_failure_stays_faulted() {
        let mut display = open_failing_after(0);
        let _ = display.flush();
        assert!(matches!(display.reinit(), Err(Error::Init(MockError))));
        assert_eq!(display.state(), State::Faulted);
    }

    #[test]
    fn test_pass_through_commands() {
        let mut display = open_display();
        display.set_contrast(0x42).unwrap();
        display.invert(true).unwrap();
        display.power_off().unwrap();
        assert!(!display.is_display_on());
        display.power_on().unwrap();
        display.set_start_line(8).unwrap();

        let commands = &display.interface.commands[POWER_ON_128X64.len()..];
        assert_eq!(
            commands,
            [
                vec![0x81, 0x42],
                vec![0xA7],
                vec![0xAE],
                vec![0xAF],
                vec![0x48]
            ]
        );
    }

    #[test]
    fn test_parameter_error_sends_nothing() {
        let mut display = open_display();
        let sends = display.interface.sends;
        assert!(matches!(
            display.set_start_line(64),
            Err(Error::Parameter(_))
        ));
        assert_eq!(display.interface.sends, sends);
        assert_eq!(display.state(), State::Ready);
    }

    #[test]
    fn test_scroll_sequence() {
        let mut display = open_display();
        display
            .start_scroll(ScrollDirection::Right, 0, 7, ScrollInterval::Frames5)
            .unwrap();
        let commands = &display.interface.commands[POWER_ON_128X64.len()..];
        assert_eq!(
            commands,
            [
                vec![0x2E],
                vec![0x26, 0x00, 0x00, 0x00, 0x07, 0x00, 0xFF],
                vec![0x2F]
            ]
        );

        display.stop_scroll().unwrap();
        assert_eq!(display.interface.data.len(), 1);
    }

    #[test]
    fn test_buffer_operations_through_session() {
        let mut display = open_display();
        display.clear(true).unwrap();
        assert!(display.buffer().as_bytes().iter().all(|b| *b == 0xFF));

        let data = [0x00u8];
        let bitmap = Bitmap::new(&data, 1, 1).unwrap();
        display.blit(&bitmap, 127, 63).unwrap();
        assert_eq!(display.buffer().get_pixel(127, 63), Ok(false));
        assert!(matches!(
            display.blit(&bitmap, 128, 0),
            Err(Error::OutOfBounds(_))
        ));

        display.buffer_mut().unwrap().set_pixel(2, 2, false).unwrap();
        assert_eq!(display.buffer().get_pixel(2, 2), Ok(false));
    }

    #[test]
    fn test_close_powers_off_and_releases() {
        let mut display = open_display();
        display.close().unwrap();
        assert_eq!(display.state(), State::Closed);
        assert_eq!(display.interface.commands.last(), Some(&vec![0xAE]));
        assert_eq!(display.interface.released, 1);
    }

    #[test]
    fn test_close_twice_is_noop() {
        let mut display = open_display();
        display.close().unwrap();
        let sends = display.interface.sends;
        display.close().unwrap();
        assert_eq!(display.interface.sends, sends);
        assert_eq!(display.interface.released, 1);
    }

    #[test]
    fn test_operations_after_close_are_invalid_state() {
        let mut display = open_display();
        display.close().unwrap();
        assert!(matches!(
            display.flush(),
            Err(Error::InvalidState(State::Closed))
        ));
        assert!(matches!(
            display.set_contrast(1),
            Err(Error::InvalidState(State::Closed))
        ));
        assert!(matches!(
            display.reinit(),
            Err(Error::InvalidState(State::Closed))
        ));
    }

    #[test]
    fn test_close_faulted_session_skips_power_off() {
        let mut display = open_failing_after(0);
        let _ = display.flush();
        let sends = display.interface.sends;
        display.close().unwrap();
        assert_eq!(display.interface.sends, sends);
        assert_eq!(display.interface.released, 1);
    }

    #[test]
    fn test_close_reports_power_off_failure_but_closes() {
        let mut display = open_failing_after(0);
        assert!(matches!(display.close(), Err(Error::BusWrite(MockError))));
        assert_eq!(display.state(), State::Closed);
        assert_eq!(display.interface.released, 1);
    }

    #[test]
    fn test_state_display_names() {
        use std::string::ToString;

        assert_eq!(State::Ready.to_string(), "ready");
        assert_eq!(State::Faulted.to_string(), "faulted");
    }
}
