// Axel '0vercl0k' Souchet - October 15 2026
//! Pull strings out of guest memory.
//!
//! The requests carry two kinds of strings: ASCII ones (file modes, archive
//! and folder entry names) and 16-bit ones where only the low byte of every
//! unit matters (paths). Archive and folder entry names are plain C strings
//! ([`read_cstr`]); [`read_ascii`] handles the padded strings that may be
//! stored behind a pointer.
//!
//! Reads never fail: running out of main RAM yields an empty string.
use crate::{GuestAddr, GuestReader, Memory};

/// Whether an ASCII scan may follow a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// While nothing has been collected yet, a word-aligned position is also
    /// tried as a pointer to the string. The string it points to is read
    /// with [`Redirect::Never`], so at most one pointer is followed.
    Leading,
    /// Only read the bytes where they are.
    Never,
}

/// A string pulled out of guest memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    /// Where the bytes making up the string end: past the terminator for an
    /// inline string, past the pointer when the string was redirected, and
    /// the start address when the scan was abandoned.
    pub end: GuestAddr,
}

impl Extracted {
    fn abandoned(start: GuestAddr) -> Self {
        Self {
            text: String::new(),
            end: start,
        }
    }
}

/// Read an ASCII string at `addr`.
///
/// Here is how the bytes are consumed, one position at a time:
/// - the scan is abandoned (empty string) as soon as the position leaves main
///   RAM, or if more than `max_len` bytes get scanned,
/// - a zero at an odd position is padding and is skipped,
/// - with [`Redirect::Leading`], a word-aligned position reached before any
///   character got collected is also read as a pointer; if the string it
///   points to isn't empty, it is the result,
/// - a zero at an even position terminates the string,
/// - anything else is a character.
pub fn read_ascii<M: Memory + ?Sized>(
    reader: &GuestReader<'_, M>,
    addr: GuestAddr,
    redirect: Redirect,
    max_len: usize,
) -> Extracted {
    let mut text = String::new();
    // We are at the leading positions until the first character shows up.
    let mut leading = true;
    let mut cur = addr;
    for _ in 0..max_len {
        let Some(c) = reader.read8(cur) else {
            return Extracted::abandoned(addr);
        };

        if c == 0 && !cur.even() && leading {
            cur = cur.offset(1);
            continue;
        }

        if leading && redirect == Redirect::Leading && cur.word_aligned() {
            if let Some(ptr) = reader.read32(cur) {
                let pointed = read_ascii(reader, GuestAddr::new(ptr), Redirect::Never, max_len);
                if !pointed.text.is_empty() {
                    return Extracted {
                        text: pointed.text,
                        end: cur.offset(4),
                    };
                }
            }
        }

        if c == 0 && cur.even() {
            return Extracted {
                text,
                end: cur.offset(1),
            };
        }

        if c != 0 {
            text.push(char::from(c));
            leading = false;
        }

        cur = cur.offset(1);
    }

    Extracted::abandoned(addr)
}

/// Read a plain zero-terminated ASCII string at `addr`: every byte up to the
/// first zero is a character, wherever it sits. Leaving main RAM or scanning
/// more than `max_len` bytes abandons it.
pub fn read_cstr<M: Memory + ?Sized>(
    reader: &GuestReader<'_, M>,
    addr: GuestAddr,
    max_len: usize,
) -> Extracted {
    let mut text = String::new();
    let mut cur = addr;
    for _ in 0..max_len {
        let Some(c) = reader.read8(cur) else {
            return Extracted::abandoned(addr);
        };

        cur = cur.offset(1);
        if c == 0 {
            return Extracted { text, end: cur };
        }

        text.push(char::from(c));
    }

    Extracted::abandoned(addr)
}

/// Read a string of 16-bit units at `addr`, keeping the low byte of every
/// unit. A zero unit terminates it; leaving main RAM or scanning more than
/// `max_len` units abandons it.
pub fn read_wide<M: Memory + ?Sized>(
    reader: &GuestReader<'_, M>,
    addr: GuestAddr,
    max_len: usize,
) -> Extracted {
    let mut text = String::new();
    let mut cur = addr;
    for _ in 0..max_len {
        let Some(unit) = reader.read16(cur) else {
            return Extracted::abandoned(addr);
        };

        cur = cur.offset(2);
        if unit == 0 {
            return Extracted { text, end: cur };
        }

        text.push(char::from(unit.to_le_bytes()[0]));
    }

    Extracted::abandoned(addr)
}

/// Render bytes as space separated hexadecimal pairs.
///
/// # Examples
///
/// ```
/// assert_eq!(fifo_dissector::strings::hex(&[0xde, 0xad, 0x0f]), "de ad 0f");
/// ```
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{read_ascii, read_cstr, read_wide, Redirect};
    use crate::memory::MAIN_RAM_BASE;
    use crate::{Cpu, GuestAddr, GuestReader, Memory, RamImage};

    const MAX: usize = 256;

    /// A [`Memory`] that counts how many reads go through it.
    struct Counting {
        ram: RamImage,
        reads: Cell<usize>,
    }

    impl Memory for Counting {
        fn read8(&self, cpu: Cpu, addr: GuestAddr) -> u8 {
            self.reads.set(self.reads.get() + 1);
            self.ram.read8(cpu, addr)
        }
    }

    fn ram() -> RamImage {
        RamImage::zeroed(MAIN_RAM_BASE, 0x1_000).unwrap()
    }

    #[test]
    fn outside_main_ram_reads_nothing() {
        let mem = Counting {
            ram: ram(),
            reads: Cell::new(0),
        };
        let reader = GuestReader::new(&mem, Cpu::Arm9);
        let addr = GuestAddr::new(0x0300_0000);
        assert_eq!(read_ascii(&reader, addr, Redirect::Leading, MAX).text, "");
        assert_eq!(read_wide(&reader, addr, MAX).text, "");
        assert_eq!(mem.reads.get(), 0);
    }

    #[test]
    fn ascii_stops_at_even_zero() {
        let mut ram = ram();
        let addr = MAIN_RAM_BASE.offset(0x10);
        ram.write(addr, b"rb\0\0wat\0");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let s = read_ascii(&reader, addr, Redirect::Never, MAX);
        assert_eq!(s.text, "rb");
        assert_eq!(s.end, addr.offset(3));

        // The zero right after `r` is at an odd address so it doesn't stop
        // the scan.
        let addr = MAIN_RAM_BASE.offset(0x30);
        ram.write(addr, b"r\0w\0");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        assert_eq!(read_ascii(&reader, addr, Redirect::Never, MAX).text, "rw");
    }

    #[test]
    fn ascii_skips_leading_odd_padding() {
        let mut ram = ram();
        let addr = MAIN_RAM_BASE.offset(0x21);
        ram.write(addr, b"\0hi\0");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        assert_eq!(read_ascii(&reader, addr, Redirect::Never, MAX).text, "hi");
    }

    #[test]
    fn ascii_follows_one_pointer() {
        let mut ram = ram();
        let ptr_at = MAIN_RAM_BASE.offset(0x40);
        let string_at = MAIN_RAM_BASE.offset(0x80);
        let second_ptr_at = MAIN_RAM_BASE.offset(0xc0);
        ram.write32(ptr_at, string_at.u32());
        ram.write(string_at, b"nand:/title\0");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let s = read_ascii(&reader, ptr_at, Redirect::Leading, MAX);
        assert_eq!(s.text, "nand:/title");
        assert_eq!(s.end, ptr_at.offset(4));

        // Without redirection, the pointer's bytes are the string: 0x80 then
        // a zero at an even address.
        let s = read_ascii(&reader, ptr_at, Redirect::Never, MAX);
        assert_eq!(s.text, "\u{80}");

        // Pointers to pointers are not followed: we get the bytes of the
        // first pointer, not the title.
        ram.write32(second_ptr_at, ptr_at.u32());
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let s = read_ascii(&reader, second_ptr_at, Redirect::Leading, MAX);
        assert_eq!(s.text, "\u{80}");
    }

    #[test]
    fn ascii_inline_is_not_mistaken_for_pointer() {
        let mut ram = ram();
        let addr = MAIN_RAM_BASE.offset(0x100);
        ram.write(addr, b"r\0\0\0");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        assert_eq!(read_ascii(&reader, addr, Redirect::Leading, MAX).text, "r");
    }

    #[test]
    fn ascii_abandons_unterminated() {
        let mut ram = ram();
        let addr = MAIN_RAM_BASE.offset(0x200);
        ram.write(addr, b"aaaaaaaa");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        assert_eq!(read_ascii(&reader, addr, Redirect::Never, 4).text, "");
    }

    #[test]
    fn cstr_stops_at_first_zero() {
        let mut ram = ram();
        let addr = MAIN_RAM_BASE.offset(0x280);
        ram.write(addr, b"abc\0AAAA\0");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let s = read_cstr(&reader, addr, MAX);
        assert_eq!(s.text, "abc");
        assert_eq!(s.end, addr.offset(4));

        // A word that looks like a main RAM pointer is just bytes.
        let addr = MAIN_RAM_BASE.offset(0x2c0);
        ram.write32(addr, MAIN_RAM_BASE.offset(0x280).u32());
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        assert_eq!(read_cstr(&reader, addr, MAX).text, "\u{80}\u{2}");
        assert_eq!(read_cstr(&reader, addr, 2).text, "");
        assert_eq!(read_cstr(&reader, GuestAddr::new(0x0300_0000), MAX).text, "");
    }

    #[test]
    fn wide_stops_at_zero_unit() {
        let mut ram = ram();
        let addr = MAIN_RAM_BASE.offset(0x300);
        ram.write(addr, b"A\0.\x01T\0\0\0X\0");
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let s = read_wide(&reader, addr, MAX);
        assert_eq!(s.text, "A.T");
        assert_eq!(s.end, addr.offset(8));
    }

    #[test]
    fn hex() {
        assert_eq!(super::hex(&[]), "");
        assert_eq!(super::hex(&[1, 0xff]), "01 ff");
    }
}
