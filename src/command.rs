//! SSD1306 command definitions and encoders
//!
//! This module defines the command bytes used to control the SSD1306 OLED
//! controller, and pure functions that turn named operations into
//! [`CommandSequence`]s. Nothing here touches the bus.
//!
//! ## Command Structure
//!
//! Over I2C every transaction starts with a control byte:
//! 1. `0x00` - all following bytes are commands (and their arguments)
//! 2. `0x40` - all following bytes are display RAM data
//!
//! The control byte is added by the [`interface`](crate::interface); the
//! sequences produced here contain only the command and its arguments.
//!
//! ## Example
//!
//! ```
//! use ssd1306_i2c::command;
//!
//! assert_eq!(command::set_contrast(0x7F).as_bytes(), &[0x81, 0x7F]);
//! assert_eq!(command::set_page_start(3).map(|c| c.as_bytes()[0]), Ok(0xB3));
//! assert!(command::set_page_start(8).is_err());
//! ```

use crate::error::ParameterError;

// Fundamental commands

/// Set contrast control (0x81)
///
/// Requires 1 byte: contrast level 0-255.
pub const SET_CONTRAST: u8 = 0x81;

/// Resume to RAM content display (0xA4)
pub const ENTIRE_DISPLAY_RESUME: u8 = 0xA4;

/// Entire display on, ignoring RAM content (0xA5)
pub const ENTIRE_DISPLAY_ON: u8 = 0xA5;

/// Normal display, RAM bit 1 = pixel on (0xA6)
pub const NORMAL_DISPLAY: u8 = 0xA6;

/// Inverse display, RAM bit 0 = pixel on (0xA7)
pub const INVERT_DISPLAY: u8 = 0xA7;

/// Display off, sleep mode (0xAE)
pub const DISPLAY_OFF: u8 = 0xAE;

/// Display on (0xAF)
pub const DISPLAY_ON: u8 = 0xAF;

/// No operation (0xE3)
///
/// Used to probe a bus address without changing controller state.
pub const NOP: u8 = 0xE3;

// Scrolling commands

/// Right horizontal scroll setup (0x26)
///
/// Requires 6 bytes: [0x00, start page, interval, end page, 0x00, 0xFF]
pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;

/// Left horizontal scroll setup (0x27)
///
/// Same arguments as [`RIGHT_HORIZONTAL_SCROLL`].
pub const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;

/// Deactivate scroll (0x2E)
///
/// RAM must be rewritten after scrolling is stopped.
pub const DEACTIVATE_SCROLL: u8 = 0x2E;

/// Activate scroll (0x2F)
pub const ACTIVATE_SCROLL: u8 = 0x2F;

// Addressing commands

/// Set lower column start address for page addressing mode (0x00-0x0F)
pub const SET_LOWER_COLUMN: u8 = 0x00;

/// Set higher column start address for page addressing mode (0x10-0x1F)
pub const SET_HIGHER_COLUMN: u8 = 0x10;

/// Set memory addressing mode (0x20)
///
/// Requires 1 byte: 0x00 horizontal, 0x01 vertical, 0x02 page.
pub const SET_ADDRESSING_MODE: u8 = 0x20;

/// Set column address range (0x21)
///
/// Requires 2 bytes: [start, end], 0-127. Horizontal/vertical modes only.
pub const SET_COLUMN_ADDRESS: u8 = 0x21;

/// Set page address range (0x22)
///
/// Requires 2 bytes: [start, end], 0-7. Horizontal/vertical modes only.
pub const SET_PAGE_ADDRESS: u8 = 0x22;

/// Set page start address for page addressing mode (0xB0-0xB7)
pub const SET_PAGE_START: u8 = 0xB0;

// Hardware configuration commands

/// Set display start line (0x40-0x7F)
pub const SET_START_LINE: u8 = 0x40;

/// Segment re-map, column 0 mapped to SEG0 (0xA0)
pub const SEGMENT_REMAP_OFF: u8 = 0xA0;

/// Segment re-map, column 127 mapped to SEG0 (0xA1)
pub const SEGMENT_REMAP_ON: u8 = 0xA1;

/// Set multiplex ratio (0xA8)
///
/// Requires 1 byte: rows - 1, 15-63.
pub const SET_MULTIPLEX_RATIO: u8 = 0xA8;

/// COM output scan direction, COM0 to COM[N-1] (0xC0)
pub const COM_SCAN_NORMAL: u8 = 0xC0;

/// COM output scan direction, COM[N-1] to COM0 (0xC8)
pub const COM_SCAN_REVERSED: u8 = 0xC8;

/// Set display offset (0xD3)
///
/// Requires 1 byte: vertical shift 0-63.
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;

/// Set COM pins hardware configuration (0xDA)
///
/// Requires 1 byte: 0x02 | alternative << 4 | left/right remap << 5.
pub const SET_COM_PINS: u8 = 0xDA;

// Timing and driving commands

/// Set display clock divide ratio and oscillator frequency (0xD5)
///
/// Requires 1 byte: frequency << 4 | (divide - 1).
pub const SET_CLOCK_DIVIDE: u8 = 0xD5;

/// Set pre-charge period (0xD9)
///
/// Requires 1 byte: phase2 << 4 | phase1, each 1-15 DCLKs.
pub const SET_PRECHARGE: u8 = 0xD9;

/// Set VCOMH deselect level (0xDB)
///
/// Requires 1 byte: 0x00 (~0.65 Vcc), 0x20 (~0.77 Vcc), 0x30 (~0.83 Vcc).
pub const SET_VCOMH_DESELECT: u8 = 0xDB;

/// Charge pump setting (0x8D)
///
/// Requires 1 byte: 0x14 enable, 0x10 disable.
pub const CHARGE_PUMP: u8 = 0x8D;

/// Charge pump enable argument
pub const CHARGE_PUMP_ENABLE: u8 = 0x14;

/// Charge pump disable argument
pub const CHARGE_PUMP_DISABLE: u8 = 0x10;

/// Longest encoded command (horizontal scroll setup)
pub const MAX_COMMAND_LEN: usize = 7;

/// One controller instruction: the command byte followed by its arguments
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CommandSequence {
    bytes: [u8; MAX_COMMAND_LEN],
    len: u8,
}

impl CommandSequence {
    fn new(bytes: &[u8]) -> Self {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            bytes: buf,
            len: bytes.len() as u8,
        }
    }

    /// The encoded bytes, command first
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl AsRef<[u8]> for CommandSequence {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for CommandSequence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CommandSequence({:02X?})", self.as_bytes())
    }
}

/// Memory addressing mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressingMode {
    /// Column pointer wraps to the next page at the end of the column range
    #[default]
    Horizontal = 0x00,
    /// Page pointer wraps to the next column at the end of the page range
    Vertical = 0x01,
    /// Column pointer wraps within the current page (controller reset default)
    Page = 0x02,
}

/// Horizontal scroll direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Content moves right
    Right,
    /// Content moves left
    Left,
}

/// Time between scroll steps, in frames
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ScrollInterval {
    /// 2 frames
    Frames2 = 0b111,
    /// 3 frames
    Frames3 = 0b100,
    /// 4 frames
    Frames4 = 0b101,
    /// 5 frames
    #[default]
    Frames5 = 0b000,
    /// 25 frames
    Frames25 = 0b110,
    /// 64 frames
    Frames64 = 0b001,
    /// 128 frames
    Frames128 = 0b010,
    /// 256 frames
    Frames256 = 0b011,
}

/// Turn the panel on (leave sleep mode)
pub fn power_on() -> CommandSequence {
    CommandSequence::new(&[DISPLAY_ON])
}

/// Turn the panel off (sleep mode, RAM is kept)
pub fn power_off() -> CommandSequence {
    CommandSequence::new(&[DISPLAY_OFF])
}

/// Set contrast; the whole `u8` range is valid
pub fn set_contrast(level: u8) -> CommandSequence {
    CommandSequence::new(&[SET_CONTRAST, level])
}

/// Select the memory addressing mode
pub fn set_addressing_mode(mode: AddressingMode) -> CommandSequence {
    CommandSequence::new(&[SET_ADDRESSING_MODE, mode as u8])
}

/// Page start address for page addressing mode, 0-7
pub fn set_page_start(page: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("page", page as u32, 0, 7)?;
    Ok(CommandSequence::new(&[SET_PAGE_START | page]))
}

/// Lower nibble of the page-mode column start address
pub fn set_lower_column(column: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("column", column as u32, 0, 127)?;
    Ok(CommandSequence::new(&[SET_LOWER_COLUMN | (column & 0x0F)]))
}

/// Upper nibble of the page-mode column start address
pub fn set_upper_column(column: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("column", column as u32, 0, 127)?;
    Ok(CommandSequence::new(&[SET_HIGHER_COLUMN | (column >> 4)]))
}

/// Column window for horizontal/vertical addressing, both ends 0-127
pub fn set_column_range(start: u8, end: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("column start", start as u32, 0, 127)?;
    ParameterError::check("column end", end as u32, start as u32, 127)?;
    Ok(CommandSequence::new(&[SET_COLUMN_ADDRESS, start, end]))
}

/// Page window for horizontal/vertical addressing, both ends 0-7
pub fn set_page_range(start: u8, end: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("page start", start as u32, 0, 7)?;
    ParameterError::check("page end", end as u32, start as u32, 7)?;
    Ok(CommandSequence::new(&[SET_PAGE_ADDRESS, start, end]))
}

/// RAM row shown on the first COM line, 0-63
pub fn set_start_line(line: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("start line", line as u32, 0, 63)?;
    Ok(CommandSequence::new(&[SET_START_LINE | line]))
}

/// Mirror the panel horizontally when `remap` is set
pub fn set_segment_remap(remap: bool) -> CommandSequence {
    let cmd = if remap {
        SEGMENT_REMAP_ON
    } else {
        SEGMENT_REMAP_OFF
    };
    CommandSequence::new(&[cmd])
}

/// Scan COM lines bottom-up when `reversed` is set
pub fn set_com_scan_direction(reversed: bool) -> CommandSequence {
    let cmd = if reversed {
        COM_SCAN_REVERSED
    } else {
        COM_SCAN_NORMAL
    };
    CommandSequence::new(&[cmd])
}

/// Swap on/off for every pixel without touching RAM
pub fn invert_display(invert: bool) -> CommandSequence {
    let cmd = if invert {
        INVERT_DISPLAY
    } else {
        NORMAL_DISPLAY
    };
    CommandSequence::new(&[cmd])
}

/// Light every pixel regardless of RAM (`false` resumes RAM content)
pub fn entire_display_on(on: bool) -> CommandSequence {
    let cmd = if on {
        ENTIRE_DISPLAY_ON
    } else {
        ENTIRE_DISPLAY_RESUME
    };
    CommandSequence::new(&[cmd])
}

/// Number of active rows, 16-64
pub fn set_multiplex_ratio(rows: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("multiplex ratio", rows as u32, 16, 64)?;
    Ok(CommandSequence::new(&[SET_MULTIPLEX_RATIO, rows - 1]))
}

/// Vertical COM shift, 0-63
pub fn set_display_offset(offset: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("display offset", offset as u32, 0, 63)?;
    Ok(CommandSequence::new(&[SET_DISPLAY_OFFSET, offset]))
}

/// Clock divide ratio (1-16) and oscillator frequency setting (0-15)
pub fn set_clock(divide: u8, frequency: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("clock divide", divide as u32, 1, 16)?;
    ParameterError::check("oscillator frequency", frequency as u32, 0, 15)?;
    Ok(CommandSequence::new(&[
        SET_CLOCK_DIVIDE,
        (frequency << 4) | (divide - 1),
    ]))
}

/// Enable the internal charge pump (panels without external VCC)
pub fn set_charge_pump(enable: bool) -> CommandSequence {
    let arg = if enable {
        CHARGE_PUMP_ENABLE
    } else {
        CHARGE_PUMP_DISABLE
    };
    CommandSequence::new(&[CHARGE_PUMP, arg])
}

/// COM pin wiring: alternative (interleaved) layout and left/right remap
pub fn set_com_pins(alternative: bool, left_right_remap: bool) -> CommandSequence {
    let arg = 0x02 | ((alternative as u8) << 4) | ((left_right_remap as u8) << 5);
    CommandSequence::new(&[SET_COM_PINS, arg])
}

/// Pre-charge phase lengths in DCLKs, each 1-15
pub fn set_precharge(phase1: u8, phase2: u8) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("precharge phase 1", phase1 as u32, 1, 15)?;
    ParameterError::check("precharge phase 2", phase2 as u32, 1, 15)?;
    Ok(CommandSequence::new(&[SET_PRECHARGE, (phase2 << 4) | phase1]))
}

/// VCOMH deselect level; only bits 4-6 are meaningful
pub fn set_vcomh_deselect(level: u8) -> Result<CommandSequence, ParameterError> {
    if level & !0x70 != 0 {
        return Err(ParameterError {
            parameter: "vcomh level",
            value: level as u32,
            min: 0x00,
            max: 0x70,
        });
    }
    Ok(CommandSequence::new(&[SET_VCOMH_DESELECT, level]))
}

/// Continuous horizontal scroll over pages `start..=end`
///
/// Must be followed by [`activate_scroll`]; the controller needs scrolling
/// deactivated before this is sent.
pub fn setup_horizontal_scroll(
    direction: ScrollDirection,
    start: u8,
    end: u8,
    interval: ScrollInterval,
) -> Result<CommandSequence, ParameterError> {
    ParameterError::check("scroll start page", start as u32, 0, 7)?;
    ParameterError::check("scroll end page", end as u32, start as u32, 7)?;
    let cmd = match direction {
        ScrollDirection::Right => RIGHT_HORIZONTAL_SCROLL,
        ScrollDirection::Left => LEFT_HORIZONTAL_SCROLL,
    };
    Ok(CommandSequence::new(&[
        cmd,
        0x00,
        start,
        interval as u8,
        end,
        0x00,
        0xFF,
    ]))
}

/// Start scrolling with the last scroll setup
pub fn activate_scroll() -> CommandSequence {
    CommandSequence::new(&[ACTIVATE_SCROLL])
}

/// Stop scrolling
pub fn deactivate_scroll() -> CommandSequence {
    CommandSequence::new(&[DEACTIVATE_SCROLL])
}

/// Command that does nothing
pub fn nop() -> CommandSequence {
    CommandSequence::new(&[NOP])
}
