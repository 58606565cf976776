// Axel '0vercl0k' Souchet - October 15 2026
//! This has the logic to decode wifi requests.
//!
//! A request starts with a 16-bit command. The two ethernet frame commands
//! carry a descriptor pointing at the frame, which gets copied out of guest
//! memory so that it can be captured.
use std::fmt::{self, Display};

use crate::addr::MAIN_RAM_TOP_BYTE;
use crate::report::{Field, Radix, Value};
use crate::strings::hex;
use crate::structs::{recv_frame, send_frame, valid_wifi_request, WifiCommand, RAW_WINDOW_LEN};
use crate::{Cpu, Cursor, GuestAddr, GuestReader, Memory};

/// A decoded wifi request. `frame` borrows the buffer the frame got copied
/// into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiReport<'buf> {
    pub cpu: Cpu,
    pub addr: GuestAddr,
    pub command: WifiCommand,
    pub fields: Vec<Field>,
    pub frame: Option<&'buf [u8]>,
}

impl WifiReport<'_> {
    /// Get the value of the field called `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        crate::report::find(&self.fields, name)
    }
}

impl Display for WifiReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IPC Wifi request at {}", self.addr)?;
        writeln!(f, "  CPU = {}", self.cpu)?;
        write!(f, "  Wifi Command = {}", self.command)?;
        for field in &self.fields {
            write!(f, "\n    {field}")?;
        }

        if let Some(frame) = self.frame {
            write!(f, "\n    Data = {}", hex(frame))?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiOutcome<'buf> {
    /// The request pointer isn't a word-aligned main RAM address; nothing
    /// was read.
    InvalidPointer(GuestAddr),
    Report(WifiReport<'buf>),
}

/// Copy the frame described by `ptr` & `len` into `buf`.
///
/// Frames that don't live in main RAM are ignored like the hardware would,
/// the ones that are too big or that run off main RAM are flagged in
/// `fields`.
fn copy_frame<'buf, M: Memory + ?Sized>(
    reader: &GuestReader<'_, M>,
    ptr: Option<u32>,
    len: Option<u32>,
    max_frame_len: u32,
    buf: &'buf mut Vec<u8>,
    fields: &mut Vec<Field>,
) -> Option<&'buf [u8]> {
    let (ptr, len) = (GuestAddr::new(ptr?), len?);
    if ptr.top_byte() != MAIN_RAM_TOP_BYTE {
        return None;
    }

    if len > max_frame_len {
        let why = format!("{len:#x} bytes is above the {max_frame_len:#x} bytes cap");
        fields.push(Field::new("Data", Value::Rejected(why)));
        return None;
    }

    buf.clear();
    buf.resize(usize::try_from(len).ok()?, 0);
    if reader.read_exact(ptr, buf).is_none() {
        let why = format!("{len:#x} bytes at {ptr} leave main RAM");
        fields.push(Field::new("Data", Value::Rejected(why)));
        return None;
    }

    Some(buf.as_slice())
}

/// Dump the bytes that follow the command.
fn window<M: Memory + ?Sized>(cursor: &mut Cursor<'_, '_, M>) -> Value {
    Value::bytes(cursor.read_vec(RAW_WINDOW_LEN))
}

/// Decode the request at `addr`. `buf` is where frames are copied, it is
/// resized as needed so it can be reused from one request to the next.
pub fn dissect<'buf, M: Memory + ?Sized>(
    reader: &GuestReader<'_, M>,
    addr: GuestAddr,
    max_frame_len: u32,
    buf: &'buf mut Vec<u8>,
) -> WifiOutcome<'buf> {
    if !valid_wifi_request(addr) {
        return WifiOutcome::InvalidPointer(addr);
    }

    let mut cursor = Cursor::new(reader, addr);
    let Some(code) = cursor.read16() else {
        return WifiOutcome::InvalidPointer(addr);
    };

    let cpu = reader.cpu();
    let command = WifiCommand::from(code);
    let mut fields = vec![];
    let mut frame = None;
    match command {
        WifiCommand::SetOwnMACAddress => {
            if cpu == Cpu::Arm9 {
                fields.push(Field::new("Unknown", window(&mut cursor)));
            }
        }
        WifiCommand::ConnectToAP => {
            fields.push(Field::new("Unknown", window(&mut cursor)));
        }
        WifiCommand::RecvEthernetFrame => {
            if cpu == Cpu::Arm7 {
                let kind = reader.read16(addr.offset(recv_frame::TYPE)).map(u32::from);
                let len = reader.read32(addr.offset(recv_frame::LENGTH));
                let ptr = reader.read32(addr.offset(recv_frame::DATA));
                fields.push(Field::new("Type", Value::word(kind, Radix::Hex)));
                fields.push(Field::new("Length", Value::word(len, Radix::Dec)));
                fields.push(Field::new("Ptr", Value::word(ptr, Radix::Hex)));
                frame = copy_frame(reader, ptr, len, max_frame_len, buf, &mut fields);
            }
        }
        WifiCommand::SendEthernetFrame => {
            if cpu == Cpu::Arm9 {
                let ptr = reader.read32(addr.offset(send_frame::DATA));
                let len = reader.read16(addr.offset(send_frame::LENGTH)).map(u32::from);
                fields.push(Field::new("Ptr", Value::word(ptr, Radix::Hex)));
                fields.push(Field::new("Length", Value::word(len, Radix::Hex)));
                frame = copy_frame(reader, ptr, len, max_frame_len, buf, &mut fields);
            }
        }
        WifiCommand::Unknown(_) => {
            fields.push(Field::new("Other", window(&mut cursor)));
        }
    }

    WifiOutcome::Report(WifiReport {
        cpu,
        addr,
        command,
        fields,
        frame,
    })
}

#[cfg(test)]
mod tests {
    use super::{dissect, WifiOutcome, WifiReport};
    use crate::memory::MAIN_RAM_BASE;
    use crate::report::Value;
    use crate::structs::WifiCommand;
    use crate::{Cpu, GuestAddr, GuestReader, RamImage};

    const REQ: GuestAddr = GuestAddr::new(0x0200_0100);
    const FRAME: GuestAddr = GuestAddr::new(0x0200_0800);
    const CAP: u32 = 0x2_000;

    fn unwrap_report<'buf>(outcome: WifiOutcome<'buf>) -> WifiReport<'buf> {
        match outcome {
            WifiOutcome::Report(report) => report,
            WifiOutcome::InvalidPointer(addr) => panic!("{addr} was rejected"),
        }
    }

    fn empty_ram() -> RamImage {
        RamImage::zeroed(MAIN_RAM_BASE, 0x1_000).unwrap()
    }

    fn recv(ram: &mut RamImage, ptr: u32, len: u32) {
        ram.write16(REQ, 0x0a);
        ram.write16(REQ.offset(6), 0x0800);
        ram.write32(REQ.offset(8), len);
        ram.write32(REQ.offset(12), ptr);
    }

    #[test]
    fn invalid_pointers() {
        let ram = empty_ram();
        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let mut buf = vec![];
        for addr in [0x0300_0000, 0x0200_0102, 0x0200_0001, 0] {
            let addr = GuestAddr::new(addr);
            assert_eq!(
                dissect(&reader, addr, CAP, &mut buf),
                WifiOutcome::InvalidPointer(addr)
            );
        }
    }

    #[test]
    fn recv_ethernet_frame() {
        let mut ram = empty_ram();
        recv(&mut ram, FRAME.u32(), 4);
        ram.write(FRAME, &[0xde, 0xad, 0xbe, 0xef]);
        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let mut buf = vec![0xff; 0x100];
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert_eq!(report.command, WifiCommand::RecvEthernetFrame);
        assert_eq!(report.frame, Some(&[0xde, 0xad, 0xbe, 0xef][..]));
        assert_eq!(report.field("Type").and_then(Value::as_word), Some(0x800));
        let rendered = report.to_string();
        assert!(rendered.contains("Length = 4"));
        assert!(rendered.contains("Ptr = 0x2000800"));
        assert!(rendered.contains("Data = de ad be ef"));
    }

    #[test]
    fn recv_is_arm7_only() {
        let mut ram = empty_ram();
        recv(&mut ram, FRAME.u32(), 4);
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let mut buf = vec![];
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert!(report.fields.is_empty());
        assert_eq!(report.frame, None);
    }

    #[test]
    fn frame_outside_main_ram_is_not_copied() {
        let mut ram = empty_ram();
        recv(&mut ram, 0x0300_0000, 4);
        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let mut buf = vec![];
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert_eq!(report.frame, None);
        assert_eq!(report.field("Data"), None);
    }

    #[test]
    fn oversized_frames_are_rejected() {
        let mut ram = empty_ram();
        recv(&mut ram, FRAME.u32(), CAP + 1);
        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let mut buf = vec![];
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert_eq!(report.frame, None);
        assert!(matches!(report.field("Data"), Some(Value::Rejected(_))));
        assert!(buf.is_empty());

        // Below the cap, but running off the end of main RAM.
        let mut ram = empty_ram();
        recv(&mut ram, 0x02ff_fff0, 0x20);
        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert_eq!(report.frame, None);
        assert!(matches!(report.field("Data"), Some(Value::Rejected(_))));
    }

    #[test]
    fn send_ethernet_frame() {
        let mut ram = empty_ram();
        ram.write16(REQ, 0x0b);
        ram.write32(REQ.offset(8), FRAME.u32());
        ram.write16(REQ.offset(12), 3);
        ram.write(FRAME, &[1, 2, 3]);
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let mut buf = vec![];
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert_eq!(report.frame, Some(&[1, 2, 3][..]));
        assert!(report.to_string().contains("Length = 0x3"));

        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert_eq!(report.frame, None);
    }

    #[test]
    fn windows() {
        let mut ram = empty_ram();
        ram.write16(REQ, 0x03);
        ram.write(REQ.offset(2), &[0x11; 64]);
        let reader = GuestReader::new(&ram, Cpu::Arm9);
        let mut buf = vec![];
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert_eq!(report.field("Unknown"), Some(&Value::Bytes(vec![0x11; 64])));

        // Only the arm9 dumps the mac address request.
        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        assert!(report.fields.is_empty());

        ram.write16(REQ, 0x0c);
        let reader = GuestReader::new(&ram, Cpu::Arm7);
        let report = unwrap_report(dissect(&reader, REQ, CAP, &mut buf));
        let rendered = report.to_string();
        assert!(rendered.contains("Wifi Command = WifiCmd_12"));
        assert!(rendered.contains("Other = 11 11"));
    }
}
