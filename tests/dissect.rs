// Axel '0vercl0k' Souchet - October 15 2026
use std::env;
use std::fs;
use std::path::PathBuf;

use fifo_dissector::report::Value;
use fifo_dissector::{
    CaptureWriter, Cpu, DissectorConfig, FifoApi, FileIoCommand, GuestAddr, Hook, NoCapture,
    RamImage, WifiCommand, WifiOutcome, MAIN_RAM_BASE, PCAP_GLOBAL_HEADER,
    PCAP_RECORD_HEADER_LEN,
};

const FILE_IO_REQUEST: GuestAddr = GuestAddr::new(0x0200_1000);
const WIFI_REQUEST: GuestAddr = GuestAddr::new(0x0200_2000);
const FRAME: GuestAddr = GuestAddr::new(0x0200_3000);

fn file_io_hook(addr: GuestAddr) -> u32 {
    (addr.u32() << 1) | 0x14
}

fn wifi_hook(addr: GuestAddr) -> u32 {
    (addr.u32() << 6) | 0x16
}

/// A RAM image with a completed `OpenFile` request, a `RecvEthernetFrame`
/// request and the `frame_len` bytes frame it points to.
fn ram(frame_len: u32) -> RamImage {
    let mut ram = RamImage::zeroed(MAIN_RAM_BASE, 0x4_000).unwrap();
    // OpenFile, completed, handle 0x1234, "r" then "A.TXT".
    ram.write32(FILE_IO_REQUEST, 0x0e);
    ram.write32(FILE_IO_REQUEST.offset(4), 0);
    ram.write32(FILE_IO_REQUEST.offset(16), 0x1234);
    ram.write(FILE_IO_REQUEST.offset(20), b"r\0\0\0");
    let name = "A.TXT"
        .bytes()
        .flat_map(|b| [b, 0])
        .chain([0, 0])
        .collect::<Vec<_>>();
    ram.write(FILE_IO_REQUEST.offset(20 + 16), &name);

    ram.write16(WIFI_REQUEST, 0x0a);
    ram.write16(WIFI_REQUEST.offset(6), 0x0806);
    ram.write32(WIFI_REQUEST.offset(8), frame_len);
    ram.write32(WIFI_REQUEST.offset(12), FRAME.u32());
    let frame = (0..frame_len).map(|b| b as u8).collect::<Vec<_>>();
    ram.write(FRAME, &frame);

    ram
}

fn capture_path(name: &str) -> PathBuf {
    env::temp_dir().join(format!("fifo-dissector-{}-{name}.pcap", std::process::id()))
}

#[test]
fn open_file() {
    let ram = ram(0);
    let api = FifoApi::new(DissectorConfig::default(), NoCapture);
    let hook = file_io_hook(FILE_IO_REQUEST);
    assert_eq!(Hook::classify(hook), Hook::FileIo(FILE_IO_REQUEST));

    let report = api.dissect_file_io(&ram, Cpu::Arm9, FILE_IO_REQUEST).unwrap();
    assert_eq!(report.command, FileIoCommand::OpenFile);
    assert!(report.status.completed());
    assert_eq!(report.field("Handle").and_then(Value::as_word), Some(0x1234));
    assert_eq!(report.field("Mode").and_then(Value::as_text), Some("r"));
    assert_eq!(report.field("Name").and_then(Value::as_text), Some("A.TXT"));

    let rendered = report.to_string();
    assert!(rendered.contains("IO Command = OpenFile"));
    assert!(rendered.contains("Handle = 0x1234"));
    assert!(rendered.contains("Mode = r"));
    assert!(rendered.contains("Name = A.TXT"));
}

#[test]
fn hooks_are_never_consumed() {
    let ram = ram(0x40);
    let mut api = FifoApi::new(DissectorConfig::default(), NoCapture);
    let values = [
        file_io_hook(FILE_IO_REQUEST),
        wifi_hook(WIFI_REQUEST),
        // Requests outside of main RAM.
        file_io_hook(GuestAddr::new(0x0380_0000)),
        wifi_hook(GuestAddr::new(0x0300_0000)),
        // Inert & unknown sub-commands.
        0x0000_0001,
        0xdead_bee7,
        0x0000_0003,
        0xffff_ffff,
    ];

    for cpu in [Cpu::Arm9, Cpu::Arm7] {
        for value in values {
            assert!(!api.execute_hook(&ram, cpu, value));
        }
    }
}

#[test]
fn recv_frame() {
    let ram = ram(0x40);
    let mut api = FifoApi::new(DissectorConfig::default(), NoCapture);
    let WifiOutcome::Report(report) = api.dissect_wifi(&ram, Cpu::Arm7, WIFI_REQUEST) else {
        panic!("the wifi request should be valid");
    };

    assert_eq!(report.command, WifiCommand::RecvEthernetFrame);
    assert_eq!(report.frame.map(<[u8]>::len), Some(0x40));
    assert_eq!(report.field("Type").and_then(Value::as_word), Some(0x0806));
}

#[test]
fn capture_in_memory() {
    let ram = ram(0x2a);
    let mut capture = CaptureWriter::new(Vec::new()).unwrap();
    let mut api = FifoApi::new(DissectorConfig::default(), &mut capture);
    api.execute_hook(&ram, Cpu::Arm7, wifi_hook(WIFI_REQUEST));
    // Only the arm7 receives frames.
    api.execute_hook(&ram, Cpu::Arm9, wifi_hook(WIFI_REQUEST));
    drop(api);

    let out = capture.finish().unwrap();
    assert_eq!(out.len(), PCAP_GLOBAL_HEADER.len() + PCAP_RECORD_HEADER_LEN + 0x2a);
    assert_eq!(out[..24], PCAP_GLOBAL_HEADER);
    assert_eq!(out[24 + 8..24 + 12], 0x2a_u32.to_le_bytes());
    assert_eq!(out[24 + 12..24 + 16], 0x2a_u32.to_le_bytes());
    assert_eq!(out[24 + 16], 0);
    assert_eq!(out[out.len() - 1], 0x29);
}

#[test]
fn capture_file_grows() {
    let path = capture_path("grows");
    let ram = ram(0x100);
    let config = DissectorConfig::default().with_capture_path(&path);
    let mut api = FifoApi::from_config(config).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 24);

    let mut expected = 24;
    for _ in 0..3 {
        api.execute_hook(&ram, Cpu::Arm7, wifi_hook(WIFI_REQUEST));
        expected += 16 + 0x100;
        // Records are flushed as soon as they are written.
        assert_eq!(fs::metadata(&path).unwrap().len(), expected);
    }

    drop(api);
    let out = fs::read(&path).unwrap();
    assert_eq!(out.len() as u64, expected);
    assert_eq!(out[..24], PCAP_GLOBAL_HEADER);
    fs::remove_file(&path).unwrap();
}

#[test]
fn capture_file_is_truncated() {
    let path = capture_path("truncated");
    fs::write(&path, [0xffu8; 0x100]).unwrap();
    let config = DissectorConfig::default().with_capture_path(&path);
    let api = FifoApi::from_config(config).unwrap();
    drop(api);

    assert_eq!(fs::read(&path).unwrap(), PCAP_GLOBAL_HEADER);
    fs::remove_file(&path).unwrap();
}

#[test]
fn oversized_frames_are_not_captured() {
    let ram = ram(0x100);
    let mut capture = CaptureWriter::new(Vec::new()).unwrap();
    let config = DissectorConfig::default().with_max_frame_len(0x80);
    let mut api = FifoApi::new(config, &mut capture);
    api.execute_hook(&ram, Cpu::Arm7, wifi_hook(WIFI_REQUEST));
    drop(api);

    assert_eq!(capture.finish().unwrap(), PCAP_GLOBAL_HEADER);
}
