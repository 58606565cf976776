// Axel '0vercl0k' Souchet - October 15 2026
//! A reader that only dereferences main RAM.
//!
//! The request records we decode come straight out of the guest and so do the
//! pointers inside them; nothing stops a buggy (or hostile) title from handing
//! over a pointer into IO registers. Every read the dissectors perform goes
//! through [`GuestReader`], which refuses to touch anything outside of main
//! RAM and reports it as `None` instead.
use crate::{Cpu, GuestAddr, Memory};

/// Is every byte of `[addr, addr + len)` in main RAM? An empty range only
/// needs `addr` itself to be.
fn spans_main_ram(addr: GuestAddr, len: u32) -> bool {
    addr.in_main_ram() && addr.checked_offset_in_main_ram(len.saturating_sub(1)).is_some()
}

pub struct GuestReader<'mem, M: Memory + ?Sized> {
    memory: &'mem M,
    cpu: Cpu,
}

impl<'mem, M: Memory + ?Sized> GuestReader<'mem, M> {
    pub fn new(memory: &'mem M, cpu: Cpu) -> Self {
        Self { memory, cpu }
    }

    /// The processor whose view of memory we read.
    #[must_use]
    pub fn cpu(&self) -> Cpu {
        self.cpu
    }

    /// Read a `u8` at `addr` if it is in main RAM.
    #[must_use]
    pub fn read8(&self, addr: GuestAddr) -> Option<u8> {
        addr.in_main_ram()
            .then(|| self.memory.read8(self.cpu, addr))
    }

    /// Read a `u16` at `addr` if both of its bytes are in main RAM.
    #[must_use]
    pub fn read16(&self, addr: GuestAddr) -> Option<u16> {
        spans_main_ram(addr, 2).then(|| self.memory.read16(self.cpu, addr))
    }

    /// Read a `u32` at `addr` if all of its bytes are in main RAM.
    #[must_use]
    pub fn read32(&self, addr: GuestAddr) -> Option<u32> {
        spans_main_ram(addr, 4).then(|| self.memory.read32(self.cpu, addr))
    }

    /// Read `buf.len()` bytes starting at `addr`. Nothing is read unless the
    /// whole range is in main RAM.
    #[must_use]
    pub fn read_exact(&self, addr: GuestAddr, buf: &mut [u8]) -> Option<()> {
        let len = u32::try_from(buf.len()).ok()?;
        if !spans_main_ram(addr, len) {
            return None;
        }

        let mut cur = addr;
        for byte in buf.iter_mut() {
            *byte = self.memory.read8(self.cpu, cur);
            cur = cur.offset(1);
        }

        Some(())
    }

    /// Read `len` bytes starting at `addr` into a new buffer.
    #[must_use]
    pub fn read_vec(&self, addr: GuestAddr, len: u32) -> Option<Vec<u8>> {
        let mut buf = vec![0; usize::try_from(len).ok()?];
        self.read_exact(addr, &mut buf)?;

        Some(buf)
    }
}

/// A [`GuestReader`] with a position; it is what the dissectors use to walk
/// request records field by field.
pub struct Cursor<'reader, 'mem, M: Memory + ?Sized> {
    reader: &'reader GuestReader<'mem, M>,
    pos: GuestAddr,
}

impl<'reader, 'mem, M: Memory + ?Sized> Cursor<'reader, 'mem, M> {
    pub fn new(reader: &'reader GuestReader<'mem, M>, pos: GuestAddr) -> Self {
        Self { reader, pos }
    }

    #[must_use]
    pub fn pos(&self) -> GuestAddr {
        self.pos
    }

    pub fn seek(&mut self, pos: GuestAddr) {
        self.pos = pos;
    }

    pub fn skip(&mut self, n: u32) {
        self.pos = self.pos.offset(n);
    }

    /// Read a `u16` and move past it. The cursor moves even if the read is
    /// refused so that the fields after it stay where they are.
    pub fn read16(&mut self) -> Option<u16> {
        let v = self.reader.read16(self.pos);
        self.skip(2);

        v
    }

    /// Read a `u32` and move past it; same rules as [`Cursor::read16`].
    pub fn read32(&mut self) -> Option<u32> {
        let v = self.reader.read32(self.pos);
        self.skip(4);

        v
    }

    /// Read `len` bytes and move past them; same rules as [`Cursor::read16`].
    pub fn read_vec(&mut self, len: u32) -> Option<Vec<u8>> {
        let v = self.reader.read_vec(self.pos, len);
        self.skip(len);

        v
    }
}
