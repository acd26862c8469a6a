//! In-memory pixel store in the controller's native layout
//!
//! The SSD1306 RAM is split into 8-row pages. Each byte holds one column of
//! a page, bit N being row N of that page:
//!
//! ```text
//!            column 0   column 1   ...
//! page 0     byte 0     byte 1     ...   rows 0-7
//! page 1     byte W     byte W+1   ...   rows 8-15
//! ```
//!
//! so pixel (x, y) lives in byte `(y / 8) * width + x`, mask `1 << (y % 8)`.
//! The buffer can be written to the controller as-is in horizontal
//! addressing mode.
//!
//! ## Example
//!
//! ```
//! use ssd1306_i2c::{Dimensions, FrameBuffer};
//!
//! let dims = match Dimensions::new(128, 64) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let mut buffer = FrameBuffer::new(dims);
//! let _ = buffer.set_pixel(3, 10, true);
//! assert_eq!(buffer.as_bytes()[128 + 3], 0b0000_0100);
//!
//! // Out-of-range writes are rejected, not clipped
//! assert!(buffer.set_pixel(128, 0, true).is_err());
//! ```

use crate::config::{Dimensions, MAX_HEIGHT, MAX_WIDTH};
use crate::error::{OutOfBounds, ParameterError};

/// Bytes needed for the largest supported panel (128x64)
pub const MAX_BUFFER_SIZE: usize = MAX_WIDTH as usize * MAX_HEIGHT as usize / 8;

/// Page of pixel (x, y) and the bit mask inside it
fn page_location(x: u32, y: u32, width: u32) -> (usize, u8) {
    let index = ((y / 8) * width + x) as usize;
    let bit = 0x01 << (y % 8);
    (index, bit)
}

/// A rectangular 1-bpp source image for [`FrameBuffer::blit`]
///
/// Rows are stored top to bottom, each padded to a whole number of bytes,
/// with the most significant bit as the leftmost pixel. This is the layout
/// of XBM-style and embedded-graphics `ImageRaw<BinaryColor>` data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitmap<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Bitmap<'a> {
    /// Wrap packed image data
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] if `data` is shorter than
    /// `ceil(width / 8) * height` bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, ParameterError> {
        let required = (width as usize)
            .div_ceil(8)
            .saturating_mul(height as usize);
        if data.len() < required {
            return Err(ParameterError {
                parameter: "bitmap length",
                value: u32::try_from(data.len()).unwrap_or(u32::MAX),
                min: u32::try_from(required).unwrap_or(u32::MAX),
                max: u32::MAX,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Whether the pixel at (x, y) is set; coordinates must be in range
    fn pixel(&self, x: u32, y: u32) -> bool {
        let byte = self.data[y as usize * self.stride() + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }
}

/// 1-bpp frame buffer in SSD1306 page order
///
/// Always `pages * width` bytes long. Mutations never touch the bus; the
/// [`Display`](crate::display::Display) writes the buffer out on flush.
#[derive(Clone)]
pub struct FrameBuffer {
    dimensions: Dimensions,
    buffer: [u8; MAX_BUFFER_SIZE],
}

impl FrameBuffer {
    /// Allocate a zeroed buffer for `dimensions`
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            buffer: [0; MAX_BUFFER_SIZE],
        }
    }

    /// Buffer dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions.width() as u32
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions.height() as u32
    }

    fn locate(&self, x: u32, y: u32) -> Result<(usize, u8), OutOfBounds> {
        if x >= self.width() || y >= self.height() {
            return Err(OutOfBounds { x, y, w: 1, h: 1 });
        }
        Ok(page_location(x, y, self.width()))
    }

    /// Turn the pixel at (x, y) on or off
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if x >= width or y >= height; the buffer is
    /// left unchanged.
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) -> Result<(), OutOfBounds> {
        let (index, bit) = self.locate(x, y)?;
        if on {
            self.buffer[index] |= bit;
        } else {
            self.buffer[index] &= !bit;
        }
        Ok(())
    }

    /// Read back the pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<bool, OutOfBounds> {
        let (index, bit) = self.locate(x, y)?;
        Ok(self.buffer[index] & bit != 0)
    }

    /// Set every pixel on or off
    pub fn clear(&mut self, on: bool) {
        let fill = if on { 0xFF } else { 0x00 };
        let len = self.dimensions.buffer_size();
        self.buffer[..len].fill(fill);
    }

    /// Copy `bitmap` with its top-left corner at (x, y)
    ///
    /// Both set and cleared source pixels are copied.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if any part of the bitmap would land outside
    /// the buffer. Nothing is copied in that case.
    pub fn blit(&mut self, bitmap: &Bitmap<'_>, x: u32, y: u32) -> Result<(), OutOfBounds> {
        let (w, h) = (bitmap.width(), bitmap.height());
        let fits_x = x.checked_add(w).is_some_and(|right| right <= self.width());
        let fits_y = y.checked_add(h).is_some_and(|bottom| bottom <= self.height());
        if !fits_x || !fits_y {
            return Err(OutOfBounds { x, y, w, h });
        }

        let width = self.width();
        for row in 0..h {
            for col in 0..w {
                let (index, bit) = page_location(x + col, y + row, width);
                if bitmap.pixel(col, row) {
                    self.buffer[index] |= bit;
                } else {
                    self.buffer[index] &= !bit;
                }
            }
        }
        Ok(())
    }

    /// Buffer contents in controller page order
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.dimensions.buffer_size()]
    }
}

impl core::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("dimensions", &self.dimensions)
            .field("len", &self.dimensions.buffer_size())
            .finish_non_exhaustive()
    }
}
