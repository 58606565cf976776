// Axel '0vercl0k' Souchet - October 15 2026
//! The memory accessor the dissector reads guest memory through.
//!
//! The emulated bus lives outside of this crate; hosts implement [`Memory`] on
//! top of it. [`RamImage`] is a simple implementation over a snapshot of
//! main RAM, handy to replay hooks offline.
use std::fmt::{self, Debug};
use std::fs;
use std::path::Path;

use crate::error::{FifoError, Result};
use crate::{Cpu, GuestAddr};

/// Read access to the address space of one of the emulated processors.
///
/// Multi-byte reads are little-endian. Implementations are expected to never
/// fail: unmapped memory reads as whatever the bus returns (open bus, zero,
/// ...).
pub trait Memory {
    fn read8(&self, cpu: Cpu, addr: GuestAddr) -> u8;

    fn read16(&self, cpu: Cpu, addr: GuestAddr) -> u16 {
        u16::from_le_bytes([self.read8(cpu, addr), self.read8(cpu, addr.offset(1))])
    }

    fn read32(&self, cpu: Cpu, addr: GuestAddr) -> u32 {
        let lo = self.read16(cpu, addr);
        let hi = self.read16(cpu, addr.offset(2));

        u32::from(lo) | (u32::from(hi) << 16)
    }
}

impl<M: Memory + ?Sized> Memory for &M {
    fn read8(&self, cpu: Cpu, addr: GuestAddr) -> u8 {
        (**self).read8(cpu, addr)
    }

    fn read16(&self, cpu: Cpu, addr: GuestAddr) -> u16 {
        (**self).read16(cpu, addr)
    }

    fn read32(&self, cpu: Cpu, addr: GuestAddr) -> u32 {
        (**self).read32(cpu, addr)
    }
}

/// Base address of main RAM.
pub const MAIN_RAM_BASE: GuestAddr = GuestAddr::new(0x0200_0000);

/// A flat image of guest memory mapped at `base`. Both processors see the
/// same bytes and reads outside of the image return zero.
#[derive(Clone, Default)]
pub struct RamImage {
    base: GuestAddr,
    bytes: Vec<u8>,
}

impl Debug for RamImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RamImage")
            .field("base", &self.base)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl RamImage {
    /// Create an image from `bytes` mapped at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image would extend past the end of the 32-bit
    /// address space.
    pub fn new(base: GuestAddr, bytes: Vec<u8>) -> Result<Self> {
        let len = u32::try_from(bytes.len()).map_err(|_| FifoError::ImageTooLarge(bytes.len()))?;
        if base.u32().checked_add(len).is_none() {
            return Err(FifoError::ImageTooLarge(bytes.len()));
        }

        Ok(Self { base, bytes })
    }

    /// Create a zeroed image of `len` bytes mapped at `base`.
    pub fn zeroed(base: GuestAddr, len: usize) -> Result<Self> {
        Self::new(base, vec![0; len])
    }

    /// Load a raw dump of main RAM from disk; it gets mapped at
    /// [`MAIN_RAM_BASE`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(MAIN_RAM_BASE, fs::read(path)?)
    }

    #[must_use]
    pub fn base(&self) -> GuestAddr {
        self.base
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Translate `addr` into an index in the image.
    fn index(&self, addr: GuestAddr) -> Option<usize> {
        let idx = usize::try_from(addr.u32().checked_sub(self.base.u32())?).ok()?;

        (idx < self.bytes.len()).then_some(idx)
    }

    /// Get a view over `len` bytes starting at `addr`, if the image backs all
    /// of them.
    #[must_use]
    pub fn slice(&self, addr: GuestAddr, len: usize) -> Option<&[u8]> {
        let start = self.index(addr)?;
        let end = start.checked_add(len)?;

        self.bytes.get(start..end)
    }

    /// Write `data` at `addr`. Bytes that fall outside of the image are
    /// dropped; returns how many were written.
    pub fn write(&mut self, addr: GuestAddr, data: &[u8]) -> usize {
        let mut written = 0;
        for (n, byte) in data.iter().enumerate() {
            let Ok(n) = u32::try_from(n) else {
                break;
            };

            if let Some(idx) = self.index(addr.offset(n)) {
                self.bytes[idx] = *byte;
                written += 1;
            }
        }

        written
    }

    pub fn write16(&mut self, addr: GuestAddr, value: u16) {
        self.write(addr, &value.to_le_bytes());
    }

    pub fn write32(&mut self, addr: GuestAddr, value: u32) {
        self.write(addr, &value.to_le_bytes());
    }
}

impl Memory for RamImage {
    fn read8(&self, _cpu: Cpu, addr: GuestAddr) -> u8 {
        self.index(addr).map_or(0, |idx| self.bytes[idx])
    }
}
