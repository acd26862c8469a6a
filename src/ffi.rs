//! C-compatible function surface
//!
//! Entry points for host-language bindings. Each session lives behind an
//! opaque [`Ssd1306Handle`] pointer; every call returns an
//! [`Ssd1306Status`]. Panics never cross the boundary.
//!
//! ```c
//! Ssd1306Config cfg = { 128, 64, 0x3C, false, true, true, 0 };
//! Ssd1306Handle *oled = NULL;
//! if (ssd1306_open("/dev/i2c-1", &cfg, &oled) == SSD1306_OK) {
//!     ssd1306_set_pixel(oled, 10, 10, true);
//!     ssd1306_flush(oled);
//!     ssd1306_close(oled);
//!     ssd1306_free(oled);
//! }
//! ```

#![allow(unsafe_code)]

use std::boxed::Box;
use std::ffi::{CStr, OsStr, c_char, c_int};
use std::os::unix::ffi::OsStrExt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use linux_embedded_hal::I2cdev;

use crate::config::{Builder, Config, Dimensions, VccSource};
use crate::display::{Display, LinuxDisplay};
use crate::error::{BuilderError, Error, ParameterError};
use crate::framebuffer::Bitmap;
use crate::interface::{DisplayInterface, I2cInterface};

/// Result code of every entry point
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ssd1306Status {
    /// Success
    Ok = 0,
    /// Bus device missing, access denied or address not acknowledged
    BusOpen = 1,
    /// Bus write failed; the session is now faulted
    BusWrite = 2,
    /// Power-on sequence failed
    Init = 3,
    /// Argument out of range
    Parameter = 4,
    /// Pixel or bitmap outside the frame buffer
    OutOfBounds = 5,
    /// Session is not ready (closed or initializing)
    InvalidState = 6,
    /// Session faulted by an earlier bus error
    SessionFaulted = 7,
    /// Configuration rejected
    InvalidConfig = 8,
    /// A required pointer was null
    NullPointer = 9,
    /// The driver panicked
    Panic = 10,
}

impl<I: DisplayInterface> From<&Error<I>> for Ssd1306Status {
    fn from(err: &Error<I>) -> Self {
        match err {
            Error::BusOpen(_) => Self::BusOpen,
            Error::BusWrite(_) => Self::BusWrite,
            Error::Init(_) => Self::Init,
            Error::Parameter(_) => Self::Parameter,
            Error::OutOfBounds(_) => Self::OutOfBounds,
            Error::InvalidState(_) => Self::InvalidState,
            Error::SessionFaulted => Self::SessionFaulted,
        }
    }
}

/// Display configuration passed to [`ssd1306_open`]
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Ssd1306Config {
    /// Width in pixels, up to 128
    pub width: u16,
    /// Height in pixels, 16-64 in steps of 8
    pub height: u16,
    /// 7-bit bus address
    pub address: u8,
    /// Panel VCC is supplied externally
    pub external_vcc: bool,
    /// Horizontal mirror
    pub segment_remap: bool,
    /// Vertical mirror
    pub com_scan_reversed: bool,
    /// First controller column wired to the panel
    pub column_offset: u8,
}

impl TryFrom<&Ssd1306Config> for Config {
    type Error = BuilderError;

    fn try_from(raw: &Ssd1306Config) -> Result<Self, Self::Error> {
        let vcc = if raw.external_vcc {
            VccSource::External
        } else {
            VccSource::Internal
        };
        Builder::new()
            .dimensions(Dimensions::new(raw.width, raw.height)?)
            .address(raw.address)
            .vcc(vcc)
            .segment_remap(raw.segment_remap)
            .com_scan_reversed(raw.com_scan_reversed)
            .column_offset(raw.column_offset)
            .build()
    }
}

/// Opaque session handle
///
/// Sessions opened through [`ssd1306_open`] always sit on a Linux I2C bus.
pub struct Ssd1306Handle<I: DisplayInterface = I2cInterface<I2cdev>>(Display<I>);

fn guard<F: FnOnce() -> Ssd1306Status>(f: F) -> Ssd1306Status {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(Ssd1306Status::Panic)
}

fn status<I: DisplayInterface>(result: Result<(), Error<I>>) -> Ssd1306Status {
    match result {
        Ok(()) => Ssd1306Status::Ok,
        Err(err) => Ssd1306Status::from(&err),
    }
}

// Every function below takes a `handle` that must be null or a live pointer
// from `into_raw` that has not been freed.
impl<I: DisplayInterface> Ssd1306Handle<I> {
    fn into_raw(display: Display<I>) -> *mut Self {
        Box::into_raw(Box::new(Self(display)))
    }

    /// Run `f` on the session behind `handle`
    unsafe fn with<F>(handle: *mut Self, f: F) -> Ssd1306Status
    where
        F: FnOnce(&mut Display<I>) -> Result<(), Error<I>>,
    {
        guard(|| {
            // SAFETY: caller guarantees `handle` is null or valid and unaliased.
            let Some(handle) = (unsafe { handle.as_mut() }) else {
                return Ssd1306Status::NullPointer;
            };
            status(f(&mut handle.0))
        })
    }

    unsafe fn flush(handle: *mut Self) -> Ssd1306Status {
        // SAFETY: forwarded caller contract.
        unsafe { Self::with(handle, Display::flush) }
    }

    unsafe fn set_pixel(handle: *mut Self, x: u32, y: u32, on: bool) -> Ssd1306Status {
        // SAFETY: forwarded caller contract.
        unsafe { Self::with(handle, |display| display.set_pixel(x, y, on)) }
    }

    unsafe fn clear(handle: *mut Self, on: bool) -> Ssd1306Status {
        // SAFETY: forwarded caller contract.
        unsafe { Self::with(handle, |display| display.clear(on)) }
    }

    /// `data` must be null or point to `len` readable bytes
    unsafe fn blit(
        handle: *mut Self,
        data: *const u8,
        len: usize,
        (width, height): (u32, u32),
        (x, y): (u32, u32),
    ) -> Ssd1306Status {
        if data.is_null() {
            return Ssd1306Status::NullPointer;
        }
        // SAFETY: non-null, caller guarantees `len` readable bytes.
        let data = unsafe { std::slice::from_raw_parts(data, len) };
        // SAFETY: forwarded caller contract.
        unsafe {
            Self::with(handle, |display| {
                let bitmap = Bitmap::new(data, width, height)?;
                display.blit(&bitmap, x, y)
            })
        }
    }

    unsafe fn set_contrast(handle: *mut Self, level: c_int) -> Ssd1306Status {
        // SAFETY: forwarded caller contract.
        unsafe {
            Self::with(handle, |display| {
                let level = u8::try_from(level).map_err(|_| ParameterError {
                    parameter: "contrast",
                    value: level as u32,
                    min: 0,
                    max: 255,
                })?;
                display.set_contrast(level)
            })
        }
    }

    unsafe fn invert(handle: *mut Self, invert: bool) -> Ssd1306Status {
        // SAFETY: forwarded caller contract.
        unsafe { Self::with(handle, |display| display.invert(invert)) }
    }

    unsafe fn power(handle: *mut Self, on: bool) -> Ssd1306Status {
        // SAFETY: forwarded caller contract.
        unsafe {
            Self::with(handle, |display| {
                if on {
                    display.power_on()
                } else {
                    display.power_off()
                }
            })
        }
    }

    unsafe fn close(handle: *mut Self) -> Ssd1306Status {
        if handle.is_null() {
            return Ssd1306Status::Ok;
        }
        // SAFETY: forwarded caller contract.
        unsafe { Self::with(handle, Display::close) }
    }

    unsafe fn free(handle: *mut Self) {
        if handle.is_null() {
            return;
        }
        let _ = catch_unwind(AssertUnwindSafe(|| {
            // SAFETY: pointer came from `Box::into_raw` in `into_raw`.
            drop(unsafe { Box::from_raw(handle) });
        }));
    }
}

/// Open the display on `bus_path` and run the power-on sequence
///
/// On success `*out` receives a handle to release with [`ssd1306_free`].
///
/// # Safety
///
/// `bus_path` must be a NUL-terminated string, `config` a valid
/// [`Ssd1306Config`] and `out` writable; any of them may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_open(
    bus_path: *const c_char,
    config: *const Ssd1306Config,
    out: *mut *mut Ssd1306Handle,
) -> Ssd1306Status {
    guard(|| {
        if bus_path.is_null() || out.is_null() {
            return Ssd1306Status::NullPointer;
        }
        // SAFETY: checked non-null above, caller guarantees NUL termination.
        let path = OsStr::from_bytes(unsafe { CStr::from_ptr(bus_path) }.to_bytes());
        // SAFETY: caller guarantees `config` is null or valid.
        let Some(raw) = (unsafe { config.as_ref() }) else {
            return Ssd1306Status::NullPointer;
        };
        let config = match Config::try_from(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("rejected display config: {err}");
                return Ssd1306Status::InvalidConfig;
            }
        };

        match LinuxDisplay::open_linux(path, config) {
            Ok(display) => {
                let handle = Ssd1306Handle::into_raw(display);
                // SAFETY: checked non-null above, caller guarantees writable.
                unsafe { out.write(handle) };
                Ssd1306Status::Ok
            }
            Err(err) => {
                log::warn!("failed to open display: {err}");
                Ssd1306Status::from(&err)
            }
        }
    })
}

/// Write the frame buffer to the display
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_flush(handle: *mut Ssd1306Handle) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::flush(handle) }
}

/// Turn one buffer pixel on or off
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_set_pixel(
    handle: *mut Ssd1306Handle,
    x: u32,
    y: u32,
    on: bool,
) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::set_pixel(handle, x, y, on) }
}

/// Fill the buffer with on or off pixels
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_clear(handle: *mut Ssd1306Handle, on: bool) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::clear(handle, on) }
}

/// Copy a packed 1-bpp bitmap (MSB-first rows) into the buffer at (x, y)
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`]; `data`
/// must be null or point to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_blit(
    handle: *mut Ssd1306Handle,
    data: *const u8,
    len: usize,
    width: u32,
    height: u32,
    x: u32,
    y: u32,
) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::blit(handle, data, len, (width, height), (x, y)) }
}

/// Set contrast, 0-255
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_set_contrast(
    handle: *mut Ssd1306Handle,
    level: c_int,
) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::set_contrast(handle, level) }
}

/// Invert or restore the display
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_invert(handle: *mut Ssd1306Handle, invert: bool) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::invert(handle, invert) }
}

/// Switch the panel on or off
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_power(handle: *mut Ssd1306Handle, on: bool) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::power(handle, on) }
}

/// Power off and release the bus; safe to call repeatedly
///
/// The handle stays allocated until [`ssd1306_free`].
///
/// # Safety
///
/// `handle` must be null or a live pointer from [`ssd1306_open`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_close(handle: *mut Ssd1306Handle) -> Ssd1306Status {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::close(handle) }
}

/// Close the session if needed and free the handle
///
/// # Safety
///
/// `handle` must be null or a pointer from [`ssd1306_open`] that has not
/// been freed. It must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ssd1306_free(handle: *mut Ssd1306Handle) {
    // SAFETY: forwarded caller contract.
    unsafe { Ssd1306Handle::free(handle) }
}
