// Axel '0vercl0k' Souchet - October 15 2026
//! This contains [`GuestAddr`], a strong type for 32-bit addresses in the
//! address space of the emulated processors.
//!
//! The only range the dissector trusts for structured reads is main RAM: every
//! address whose most significant byte is `0x02`. Anything else (IO registers,
//! TCM, a garbage pointer, ...) is never dereferenced.
//!
//! # Examples
//!
//! ```
//! use fifo_dissector::GuestAddr;
//! let addr = GuestAddr::new(0x0234_5678);
//! assert!(addr.in_main_ram());
//! assert!(addr.word_aligned());
//! assert_eq!(addr.offset(2).u32(), 0x0234_567a);
//! ```
use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

/// Most significant byte shared by every address in main RAM.
pub const MAIN_RAM_TOP_BYTE: u32 = 0x02;

/// Strong type for guest addresses.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Default, PartialOrd, Ord)]
pub struct GuestAddr(u32);

impl GuestAddr {
    /// Create a new [`GuestAddr`].
    #[must_use]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Get the underlying [`u32`] out of it.
    #[must_use]
    pub const fn u32(&self) -> u32 {
        self.0
    }

    /// Get the most significant byte.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fifo_dissector::GuestAddr;
    /// assert_eq!(GuestAddr::new(0x0380_ffc8).top_byte(), 0x03);
    /// ```
    #[must_use]
    pub const fn top_byte(&self) -> u32 {
        self.0 >> 24
    }

    /// Is it in main RAM, the only window trusted for structured reads?
    ///
    /// # Examples
    ///
    /// ```
    /// # use fifo_dissector::GuestAddr;
    /// assert!(GuestAddr::new(0x02ff_ffff).in_main_ram());
    /// assert!(!GuestAddr::new(0x0300_0000).in_main_ram());
    /// ```
    #[must_use]
    pub const fn in_main_ram(&self) -> bool {
        self.top_byte() == MAIN_RAM_TOP_BYTE
    }

    /// Is it aligned on a 32-bit word?
    #[must_use]
    pub const fn word_aligned(&self) -> bool {
        (self.0 & 3) == 0
    }

    /// Is it aligned on a 16-bit half-word?
    #[must_use]
    pub const fn even(&self) -> bool {
        (self.0 & 1) == 0
    }

    /// Get the address `n` bytes after this one. The address space wraps
    /// around like the bus does.
    #[must_use]
    pub const fn offset(&self, n: u32) -> Self {
        Self(self.0.wrapping_add(n))
    }

    /// Get the address `n` bytes after this one unless it doesn't stay in
    /// main RAM.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fifo_dissector::GuestAddr;
    /// let addr = GuestAddr::new(0x02ff_fff0);
    /// assert!(addr.checked_offset_in_main_ram(0xf).is_some());
    /// assert!(addr.checked_offset_in_main_ram(0x10).is_none());
    /// ```
    #[must_use]
    pub fn checked_offset_in_main_ram(&self, n: u32) -> Option<Self> {
        let addr = Self(self.0.checked_add(n)?);

        addr.in_main_ram().then_some(addr)
    }
}

/// Convert a [`u32`] into a [`GuestAddr`].
impl From<u32> for GuestAddr {
    fn from(value: u32) -> Self {
        GuestAddr(value)
    }
}

/// Convert a [`GuestAddr`] into a [`u32`].
impl From<GuestAddr> for u32 {
    fn from(value: GuestAddr) -> Self {
        value.0
    }
}

/// Format a [`GuestAddr`] as a string.
impl Display for GuestAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Parse a [`GuestAddr`] from an hexadecimal string; the `0x` prefix and the
/// backticks the debuggers like to put in addresses are both optional.
///
/// # Examples
///
/// ```
/// # use fifo_dissector::GuestAddr;
/// let addr = "0x0200`1000".parse::<GuestAddr>().unwrap();
/// assert_eq!(addr.u32(), 0x0200_1000);
/// ```
impl FromStr for GuestAddr {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.replace('`', "");

        Ok(GuestAddr::new(u32::from_str_radix(
            s.trim_start_matches("0x"),
            16,
        )?))
    }
}
