//! Display configuration types and builder

use crate::command;
pub use crate::error::BuilderError;

/// Maximum number of columns (segment outputs) driven by the SSD1306
pub const MAX_WIDTH: u16 = 128;

/// Maximum number of rows (COM outputs) driven by the SSD1306
pub const MAX_HEIGHT: u16 = 64;

/// Smallest multiplex ratio the controller accepts
pub const MIN_HEIGHT: u16 = 16;

/// Conventional bus address (SA0 pin low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Alternate bus address (SA0 pin high)
pub const ALTERNATE_ADDRESS: u8 = 0x3D;

/// Display dimensions
///
/// Only obtainable through [`Dimensions::new`] or `Default`, so a value is
/// always within the controller's limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels (columns, corresponds to segment outputs)
    width: u16,
    /// Height in pixels (rows, corresponds to COM outputs)
    height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - width == 0 or width > MAX_WIDTH
    /// - height < MIN_HEIGHT or height > MAX_HEIGHT
    /// - height % 8 != 0 (must fill whole pages)
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) || height % 8 != 0 {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> u16 {
        self.height / 8
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.pages() as usize * self.width as usize
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: MAX_WIDTH,
            height: MAX_HEIGHT,
        }
    }
}

/// Where the panel's driving voltage comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VccSource {
    /// Generated by the on-chip charge pump
    #[default]
    Internal,
    /// Supplied on the VCC pin
    External,
}

/// Display configuration
///
/// Immutable once built; consumed when a session is opened.
/// Use `Builder` to create a Config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// 7-bit I2C address
    pub address: u8,
    /// Panel VCC source
    pub vcc: VccSource,
    /// Map column 127 to SEG0 (horizontal mirror)
    pub segment_remap: bool,
    /// Scan COM lines from COM[N-1] to COM0 (vertical mirror)
    pub com_scan_reversed: bool,
    /// Alternative COM pin configuration
    pub com_alternative: bool,
    /// COM left/right remap
    pub com_left_right_remap: bool,
    /// First controller column wired to the panel
    pub column_offset: u8,
    /// Vertical COM shift
    pub display_offset: u8,
    /// Clock divide ratio, 1-16
    pub clock_divide: u8,
    /// Oscillator frequency setting, 0-15
    pub oscillator_frequency: u8,
    /// Contrast applied during initialization
    pub contrast: u8,
}

impl Config {
    /// Charge pump enable derived from the VCC source
    pub fn charge_pump(&self) -> bool {
        self.vcc == VccSource::Internal
    }

    /// Pre-charge phases (phase1, phase2) for the VCC source
    pub fn precharge(&self) -> (u8, u8) {
        match self.vcc {
            VccSource::Internal => (0x1, 0xF),
            VccSource::External => (0x2, 0x2),
        }
    }

    /// Last controller column used by the panel
    pub fn last_column(&self) -> u16 {
        (self.column_offset as u16 + self.dimensions.width()).saturating_sub(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            address: DEFAULT_ADDRESS,
            vcc: VccSource::Internal,
            segment_remap: true,
            com_scan_reversed: true,
            com_alternative: true,
            com_left_right_remap: false,
            column_offset: 0,
            display_offset: 0,
            clock_divide: 1,
            oscillator_frequency: 8,
            contrast: 0xCF,
        }
    }
}

/// Builder for constructing display configuration
///
/// Defaults describe the common 128x64 module with internal VCC at 0x3C.
///
/// # Example
///
/// ```
/// use ssd1306_i2c::{Builder, Dimensions, VccSource};
///
/// let dims = match Dimensions::new(128, 32) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .dimensions(dims)
///     .address(0x3D)
///     .vcc(VccSource::External)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.dimensions.buffer_size(), 512);
/// assert!(!config.com_alternative);
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    dimensions: Option<Dimensions>,
    address: Option<u8>,
    vcc: VccSource,
    segment_remap: Option<bool>,
    com_scan_reversed: Option<bool>,
    com_alternative: Option<bool>,
    com_left_right_remap: bool,
    column_offset: u8,
    display_offset: u8,
    clock: Option<(u8, u8)>,
    contrast: Option<u8>,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (default 128x64)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set the 7-bit bus address (default 0x3C)
    pub fn address(mut self, address: u8) -> Self {
        self.address = Some(address);
        self
    }

    /// Set the VCC source (default internal)
    pub fn vcc(mut self, vcc: VccSource) -> Self {
        self.vcc = vcc;
        self
    }

    /// Set segment remap (default on)
    pub fn segment_remap(mut self, value: bool) -> Self {
        self.segment_remap = Some(value);
        self
    }

    /// Set COM scan direction (default reversed)
    pub fn com_scan_reversed(mut self, value: bool) -> Self {
        self.com_scan_reversed = Some(value);
        self
    }

    /// Flip the panel 180 degrees by clearing both mirror flags
    pub fn rotated_180(mut self) -> Self {
        self.segment_remap = Some(false);
        self.com_scan_reversed = Some(false);
        self
    }

    /// Set alternative COM pin configuration
    ///
    /// Defaults to alternative for 64-row panels and sequential otherwise.
    pub fn com_alternative(mut self, value: bool) -> Self {
        self.com_alternative = Some(value);
        self
    }

    /// Set COM left/right remap (default off)
    pub fn com_left_right_remap(mut self, value: bool) -> Self {
        self.com_left_right_remap = value;
        self
    }

    /// Set the first controller column wired to the panel (default 0)
    ///
    /// Narrow panels such as 64x48 or 72x40 sit in the middle of the
    /// 128-column RAM.
    pub fn column_offset(mut self, offset: u8) -> Self {
        self.column_offset = offset;
        self
    }

    /// Set the vertical display offset (default 0)
    pub fn display_offset(mut self, offset: u8) -> Self {
        self.display_offset = offset;
        self
    }

    /// Set clock divide ratio and oscillator frequency (default 1, 8)
    pub fn clock(mut self, divide: u8, frequency: u8) -> Self {
        self.clock = Some((divide, frequency));
        self
    }

    /// Set the contrast used during initialization
    ///
    /// Defaults to 0xCF for internal VCC and 0x9F for external VCC.
    pub fn contrast(mut self, contrast: u8) -> Self {
        self.contrast = Some(contrast);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::InvalidAddress` if the address needs more than 7 bits
    /// - `BuilderError::ColumnOffsetOverflow` if offset + width > 128
    /// - `BuilderError::Parameter` for out-of-range offset or clock values
    pub fn build(self) -> Result<Config, BuilderError> {
        let dimensions = self.dimensions.unwrap_or_default();

        let address = self.address.unwrap_or(DEFAULT_ADDRESS);
        if address > 0x7F {
            return Err(BuilderError::InvalidAddress(address));
        }

        if self.column_offset as u16 + dimensions.width() > MAX_WIDTH {
            return Err(BuilderError::ColumnOffsetOverflow {
                offset: self.column_offset,
                width: dimensions.width(),
            });
        }

        command::set_display_offset(self.display_offset)?;
        let (clock_divide, oscillator_frequency) = self.clock.unwrap_or((1, 8));
        command::set_clock(clock_divide, oscillator_frequency)?;

        let contrast = self.contrast.unwrap_or(match self.vcc {
            VccSource::Internal => 0xCF,
            VccSource::External => 0x9F,
        });

        Ok(Config {
            dimensions,
            address,
            vcc: self.vcc,
            segment_remap: self.segment_remap.unwrap_or(true),
            com_scan_reversed: self.com_scan_reversed.unwrap_or(true),
            com_alternative: self
                .com_alternative
                .unwrap_or(dimensions.height() == MAX_HEIGHT),
            com_left_right_remap: self.com_left_right_remap,
            column_offset: self.column_offset,
            display_offset: self.display_offset,
            clock_divide,
            oscillator_frequency,
            contrast,
        })
    }
}
